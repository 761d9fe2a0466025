//! HTTP client wrapper for the ElevenLabs text-to-speech API.

use crate::config::get_config;
use crate::tts::types::{SpeechRequest, TtsError, VoiceSettings};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::json;

/// Abstraction over the speech synthesis provider used by the service layer.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render the request to binary audio (MPEG).
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, TtsError>;
}

/// Lightweight HTTP client for ElevenLabs synthesis requests.
pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ElevenLabsClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, TtsError> {
        let config = get_config();
        Self::with_base_url(&config.eleven_base_url, config.eleven_api_key.clone())
    }

    /// Construct a client against an explicit base URL and key.
    pub fn with_base_url(base_url: &str, api_key: Option<String>) -> Result<Self, TtsError> {
        let client = Client::builder()
            .user_agent("memevox/0.2")
            .build()?;
        let base_url = normalize_base_url(base_url).map_err(TtsError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = api_key.as_deref().map(|key| !key.is_empty()).unwrap_or(false),
            "Initialized TTS HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, TtsError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(TtsError::MissingApiKey)?;

        let model_id = request
            .model_id
            .clone()
            .unwrap_or_else(|| get_config().tts_model_id.clone());
        let voice_settings = request.voice_settings.clone().unwrap_or_default();
        let url = format!(
            "{}/{}/stream",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&request.voice_id)
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .header(ACCEPT, "audio/mpeg")
            .json(&json!({
                "text": request.text,
                "model_id": model_id,
                "voice_settings": voice_settings,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = TtsError::UnexpectedStatus { status, body };
            tracing::error!(voice_id = %request.voice_id, error = %error, "Speech synthesis failed");
            return Err(error);
        }

        let audio = response.bytes().await?.to_vec();
        tracing::debug!(
            voice_id = %request.voice_id,
            model_id,
            bytes = audio.len(),
            "Speech synthesis completed"
        );
        Ok(audio)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn request() -> SpeechRequest {
        SpeechRequest {
            text: "hello world".into(),
            voice_id: "voice-1".into(),
            model_id: Some("eleven_test_v1".into()),
            voice_settings: None,
        }
    }

    #[tokio::test]
    async fn synthesize_posts_payload_and_returns_audio() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/voice-1/stream")
                    .header("xi-api-key", "secret")
                    .json_body_partial(
                        r#"{
                            "text": "hello world",
                            "model_id": "eleven_test_v1",
                            "voice_settings": { "stability": 0.5, "similarity_boost": 0.8 }
                        }"#,
                    );
                then.status(200)
                    .header("content-type", "audio/mpeg")
                    .body([0x49, 0x44, 0x33, 0x04]);
            })
            .await;

        let client = ElevenLabsClient::with_base_url(&server.base_url(), Some("secret".into()))
            .expect("client");
        let audio = client.synthesize(&request()).await.expect("audio bytes");

        mock.assert();
        assert_eq!(audio, vec![0x49, 0x44, 0x33, 0x04]);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let client =
            ElevenLabsClient::with_base_url("http://127.0.0.1:9", None).expect("client");
        let error = client.synthesize(&request()).await.expect_err("no key");
        assert!(matches!(error, TtsError::MissingApiKey));
    }

    #[tokio::test]
    async fn provider_errors_carry_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/voice-1/stream");
                then.status(422).body(r#"{"detail":"voice not found"}"#);
            })
            .await;

        let client = ElevenLabsClient::with_base_url(&server.base_url(), Some("secret".into()))
            .expect("client");
        let error = client.synthesize(&request()).await.expect_err("provider error");

        match error {
            TtsError::UnexpectedStatus { status, body } => {
                assert_eq!(status.as_u16(), 422);
                assert!(body.contains("voice not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
