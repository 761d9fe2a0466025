//! Shared types used by the speech synthesis client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors returned while talking to the speech synthesis provider.
#[derive(Debug, Error)]
pub enum TtsError {
    /// No provider API key was configured for this process.
    #[error("ELEVEN_API_KEY is not configured")]
    MissingApiKey,
    /// Base URL failed to parse or normalize.
    #[error("Invalid TTS API URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider responded with an unexpected status code.
    #[error("Unexpected TTS response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the provider.
        status: StatusCode,
        /// Diagnostic body associated with the failing response.
        body: String,
    },
}

/// Voice rendering parameters forwarded to the provider.
///
/// Unknown settings fields pass through untouched so callers can use
/// provider features this proxy does not model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Voice stability, `0.0..=1.0`.
    pub stability: f32,
    /// Similarity boost, `0.0..=1.0`.
    pub similarity_boost: f32,
    /// Additional provider settings forwarded verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.8,
            extra: Map::new(),
        }
    }
}

/// A single synthesis request.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// Text to render as speech.
    pub text: String,
    /// Provider voice identifier.
    pub voice_id: String,
    /// Optional model override; the configured default applies when absent.
    pub model_id: Option<String>,
    /// Optional voice settings; provider defaults apply when absent.
    pub voice_settings: Option<VoiceSettings>,
}
