//! Proxy service coordinating upstream fetches, clean-text extraction, and
//! audio persistence.

use crate::{
    audio::{ArtifactError, ArtifactStore, StoredArtifact, resolve_file_name},
    config::get_config,
    kym::{EntryTarget, KymClient, KymError, MemeEntry, MemeSource},
    metrics::{MetricsSnapshot, ProxyMetrics},
    text,
    tts::{ElevenLabsClient, SpeechRequest, SpeechSynthesizer, TtsError, VoiceSettings},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors emitted by the proxy pipeline.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Upstream meme API interaction failed.
    #[error("Meme API request failed: {0}")]
    Fetch(#[from] KymError),
    /// Speech synthesis provider failed.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] TtsError),
    /// Artifact naming or persistence failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Flattened entry text returned by the clean-text endpoint.
#[derive(Debug, Clone)]
pub struct CleanTextOutcome {
    /// Entry title, falling back to the requested slug or URL.
    pub title: String,
    /// Normalized plain text, one `##`-headed block per section.
    pub clean_text: String,
}

/// Parameters of a speech generation request.
#[derive(Debug, Clone)]
pub struct SpeechJob {
    /// Text to render as speech.
    pub text: String,
    /// Provider voice identifier.
    pub voice_id: String,
    /// Optional caller-supplied file name hint for the stored artifact.
    pub output_name: Option<String>,
    /// Optional model override forwarded to the provider.
    pub model_id: Option<String>,
    /// Optional voice settings forwarded to the provider.
    pub voice_settings: Option<VoiceSettings>,
}

/// Abstraction over the proxy pipeline used by external surfaces.
#[async_trait]
pub trait ProxyApi: Send + Sync {
    /// Proxy a keyword search to the upstream meme API.
    async fn search_memes(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, ProxyError>;

    /// Fetch an entry and return it unchanged.
    async fn entry_detail(&self, target: &EntryTarget) -> Result<MemeEntry, ProxyError>;

    /// Fetch an entry and flatten it into clean plain text.
    async fn entry_clean_text(&self, target: &EntryTarget)
    -> Result<CleanTextOutcome, ProxyError>;

    /// Synthesize speech and persist the audio artifact.
    async fn generate_speech(&self, job: SpeechJob) -> Result<StoredArtifact, ProxyError>;

    /// Read back a stored audio artifact by its resolved file name.
    async fn read_audio(&self, file_name: &str) -> Result<Vec<u8>, ProxyError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Coordinates the full proxy pipeline: upstream fetches, clean-text
/// extraction, speech synthesis, and artifact storage.
///
/// The service owns long-lived handles to both upstream clients, the
/// artifact store, and the metrics registry so every surface shares the same
/// components. Construct it once near process start and share it through an
/// `Arc`.
pub struct ProxyService {
    memes: Box<dyn MemeSource>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    store: ArtifactStore,
    metrics: Arc<ProxyMetrics>,
}

impl ProxyService {
    /// Build a new proxy service from the process configuration.
    pub fn new() -> Self {
        let config = get_config();
        let memes =
            Box::new(KymClient::new().expect("Failed to initialize meme API client"));
        let synthesizer =
            Box::new(ElevenLabsClient::new().expect("Failed to initialize TTS client"));
        Self::with_components(memes, synthesizer, ArtifactStore::new(config.audio_dir.clone()))
    }

    /// Build a service from explicit components; used by tests and embedders.
    pub fn with_components(
        memes: Box<dyn MemeSource>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        store: ArtifactStore,
    ) -> Self {
        Self {
            memes,
            synthesizer,
            store,
            metrics: Arc::new(ProxyMetrics::new()),
        }
    }

    /// Proxy a keyword search, clamping the result count to configured bounds.
    pub async fn search_memes(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, ProxyError> {
        let config = get_config();
        let limit = limit
            .unwrap_or(config.search_default_limit)
            .clamp(1, config.search_max_limit);

        let results = self.memes.search(query, limit).await?;
        self.metrics.record_search();
        tracing::info!(query, results = results.len(), "Search proxied");
        Ok(results)
    }

    /// Fetch an entry and return the upstream payload unchanged.
    pub async fn entry_detail(&self, target: &EntryTarget) -> Result<MemeEntry, ProxyError> {
        let entry = self.memes.fetch_entry(target).await?;
        self.metrics.record_detail();
        Ok(entry)
    }

    /// Fetch an entry and flatten its sections into clean plain text.
    pub async fn entry_clean_text(
        &self,
        target: &EntryTarget,
    ) -> Result<CleanTextOutcome, ProxyError> {
        let entry = self.memes.fetch_entry(target).await?;
        let clean_text = text::extract_clean_text(&entry);
        let title = entry
            .title
            .clone()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| target.label().to_string());

        self.metrics.record_clean_text();
        tracing::info!(target = target.label(), chars = clean_text.len(), "Entry cleaned");
        Ok(CleanTextOutcome { title, clean_text })
    }

    /// Synthesize speech for the job and persist the returned audio.
    ///
    /// The output name is validated up front so a malformed hint fails before
    /// the synthesis round-trip is paid for.
    pub async fn generate_speech(&self, job: SpeechJob) -> Result<StoredArtifact, ProxyError> {
        if let Some(hint) = job.output_name.as_deref() {
            resolve_file_name(Some(hint))?;
        }

        let request = SpeechRequest {
            text: job.text,
            voice_id: job.voice_id,
            model_id: job.model_id,
            voice_settings: job.voice_settings,
        };
        let audio = self.synthesizer.synthesize(&request).await?;
        let artifact = self.store.store(&audio, job.output_name.as_deref()).await?;

        self.metrics.record_audio();
        tracing::info!(
            voice_id = %request.voice_id,
            file = %artifact.file_name,
            bytes = audio.len(),
            "Audio artifact generated"
        );
        Ok(artifact)
    }

    /// Read back a stored audio artifact.
    pub async fn read_audio(&self, file_name: &str) -> Result<Vec<u8>, ProxyError> {
        Ok(self.store.open(file_name).await?)
    }

    /// Return the current proxy metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl ProxyApi for ProxyService {
    async fn search_memes(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, ProxyError> {
        ProxyService::search_memes(self, query, limit).await
    }

    async fn entry_detail(&self, target: &EntryTarget) -> Result<MemeEntry, ProxyError> {
        ProxyService::entry_detail(self, target).await
    }

    async fn entry_clean_text(
        &self,
        target: &EntryTarget,
    ) -> Result<CleanTextOutcome, ProxyError> {
        ProxyService::entry_clean_text(self, target).await
    }

    async fn generate_speech(&self, job: SpeechJob) -> Result<StoredArtifact, ProxyError> {
        ProxyService::generate_speech(self, job).await
    }

    async fn read_audio(&self, file_name: &str) -> Result<Vec<u8>, ProxyError> {
        ProxyService::read_audio(self, file_name).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        ProxyService::metrics_snapshot(self)
    }
}
