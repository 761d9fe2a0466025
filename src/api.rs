//! HTTP surface for the memevox proxy.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `GET /` – Liveness probe with a human-readable banner.
//! - `GET /search` – Proxy a keyword search to the upstream meme API
//!   (`?q=`, optional `?limit=`).
//! - `GET /detail` – Fetch a full entry by `?slug=` or `?url=` and echo the
//!   upstream payload unchanged.
//! - `GET /cleanText` – Fetch an entry and flatten it into clean plain text.
//! - `POST /generate-tts` – Synthesize speech, persist the audio artifact,
//!   and return its public URL.
//! - `GET /audio/{file}` – Serve a previously stored audio artifact.
//! - `GET /metrics` – Observe proxy counters.
//!
//! When `PROXY_API_KEY` is configured, every route except `/audio/*` requires
//! a matching `x-api-key` header.

use crate::audio::{ArtifactError, is_not_found};
use crate::config::get_config;
use crate::kym::{EntryTarget, MemeEntry};
use crate::metrics::MetricsSnapshot;
use crate::service::{ProxyApi, ProxyError, SpeechJob};
use crate::tts::{TtsError, VoiceSettings};
use axum::{
    Json, Router,
    extract::{Host, Path, Query, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Build the HTTP router exposing the proxy API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: ProxyApi + 'static,
{
    let gated = Router::new()
        .route("/", get(root_status))
        .route("/search", get(search_memes::<S>))
        .route("/detail", get(entry_detail::<S>))
        .route("/cleanText", get(entry_clean_text::<S>))
        .route("/generate-tts", post(generate_tts::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route_layer(middleware::from_fn(require_api_key));

    Router::new()
        .route("/audio/:file_name", get(serve_audio::<S>))
        .merge(gated)
        .with_state(service)
}

/// Liveness response for the root route.
async fn root_status() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "memevox proxy running" }))
}

/// Query parameters for the `GET /search` endpoint.
#[derive(Deserialize)]
struct SearchParams {
    /// Keyword query forwarded to the upstream.
    #[serde(default)]
    q: Option<String>,
    /// Optional result count, clamped to configured bounds downstream.
    #[serde(default)]
    limit: Option<usize>,
}

/// Success response for the `GET /search` endpoint.
#[derive(Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<Value>,
}

/// Proxy a keyword search to the upstream meme API.
async fn search_memes<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError>
where
    S: ProxyApi,
{
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing ?q=".into()))?;

    let results = service
        .search_memes(&query, params.limit)
        .await
        .map_err(|err| AppError::proxy("scrape_failed", err))?;
    Ok(Json(SearchResponse { query, results }))
}

/// Query parameters shared by the detail and clean-text endpoints.
#[derive(Deserialize)]
struct EntryParams {
    /// Bare entry slug; takes precedence over `url` when both are present.
    #[serde(default)]
    slug: Option<String>,
    /// Full entry URL.
    #[serde(default)]
    url: Option<String>,
}

impl EntryParams {
    fn target(self) -> Result<EntryTarget, AppError> {
        if let Some(slug) = self.slug.filter(|slug| !slug.trim().is_empty()) {
            return Ok(EntryTarget::Slug(slug));
        }
        if let Some(url) = self.url.filter(|url| !url.trim().is_empty()) {
            return Ok(EntryTarget::Url(url));
        }
        Err(AppError::BadRequest("Missing ?url= or ?slug=".into()))
    }
}

/// Fetch a full entry and echo the upstream payload unchanged.
async fn entry_detail<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<EntryParams>,
) -> Result<Json<MemeEntry>, AppError>
where
    S: ProxyApi,
{
    let target = params.target()?;
    let entry = service
        .entry_detail(&target)
        .await
        .map_err(|err| AppError::proxy("detail_failed", err))?;
    Ok(Json(entry))
}

/// Success response for the `GET /cleanText` endpoint.
#[derive(Serialize)]
struct CleanTextResponse {
    title: String,
    #[serde(rename = "cleanText")]
    clean_text: String,
}

/// Fetch an entry and flatten it into clean plain text.
async fn entry_clean_text<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<EntryParams>,
) -> Result<Json<CleanTextResponse>, AppError>
where
    S: ProxyApi,
{
    let target = params.target()?;
    let outcome = service
        .entry_clean_text(&target)
        .await
        .map_err(|err| AppError::proxy("clean_text_failed", err))?;
    Ok(Json(CleanTextResponse {
        title: outcome.title,
        clean_text: outcome.clean_text,
    }))
}

/// Request body for the `POST /generate-tts` endpoint.
#[derive(Deserialize)]
struct GenerateTtsRequest {
    /// Text to render as speech.
    #[serde(default)]
    text: Option<String>,
    /// Provider voice identifier.
    #[serde(default)]
    voice_id: Option<String>,
    /// Optional file name hint for the stored artifact.
    #[serde(default)]
    output_name: Option<String>,
    /// Optional model override forwarded to the provider.
    #[serde(default)]
    model_id: Option<String>,
    /// Optional voice settings forwarded to the provider.
    #[serde(default)]
    voice_settings: Option<VoiceSettings>,
}

/// Success response for the `POST /generate-tts` endpoint.
#[derive(Serialize)]
struct GenerateTtsResponse {
    status: &'static str,
    url: String,
}

/// Synthesize speech, persist the artifact, and return its public URL.
async fn generate_tts<S>(
    State(service): State<Arc<S>>,
    Host(host): Host,
    Json(request): Json<GenerateTtsRequest>,
) -> Result<Json<GenerateTtsResponse>, AppError>
where
    S: ProxyApi,
{
    let text = request.text.filter(|text| !text.trim().is_empty());
    let voice_id = request.voice_id.filter(|voice| !voice.trim().is_empty());
    let (Some(text), Some(voice_id)) = (text, voice_id) else {
        return Err(AppError::BadRequest("Missing text or voice_id".into()));
    };

    let artifact = service
        .generate_speech(SpeechJob {
            text,
            voice_id,
            output_name: request.output_name,
            model_id: request.model_id,
            voice_settings: request.voice_settings,
        })
        .await
        .map_err(|err| AppError::proxy("tts_generation_failed", err))?;

    let base_url = get_config()
        .public_base_url
        .clone()
        .unwrap_or_else(|| format!("http://{host}"));
    let url = artifact.public_locator(&base_url);
    tracing::info!(file = %artifact.file_name, url = %url, "TTS request completed");
    Ok(Json(GenerateTtsResponse {
        status: "success",
        url,
    }))
}

/// Serve a stored audio artifact as MPEG audio.
async fn serve_audio<S>(
    State(service): State<Arc<S>>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError>
where
    S: ProxyApi,
{
    let bytes = service
        .read_audio(&file_name)
        .await
        .map_err(|err| AppError::proxy("audio_read_failed", err))?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes).into_response())
}

/// Return a concise metrics snapshot with proxy counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: ProxyApi,
{
    Json(service.metrics_snapshot())
}

/// Reject requests lacking the configured `x-api-key` shared secret.
///
/// The gate is disabled entirely when no key is configured.
async fn require_api_key(request: Request, next: Next) -> Response {
    let Some(expected) = get_config().proxy_api_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());
    if provided == Some(expected) {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        )
            .into_response()
    }
}

enum AppError {
    BadRequest(String),
    Proxy {
        tag: &'static str,
        source: ProxyError,
    },
}

impl AppError {
    fn proxy(tag: &'static str, source: ProxyError) -> Self {
        Self::Proxy { tag, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            Self::Proxy { tag, source } => {
                let details = source.to_string();
                let (status, tag) = match &source {
                    ProxyError::Artifact(ArtifactError::InvalidNameHint { .. }) => {
                        (StatusCode::BAD_REQUEST, "invalid_output_name")
                    }
                    ProxyError::Artifact(error) if is_not_found(error) => {
                        (StatusCode::NOT_FOUND, "not_found")
                    }
                    ProxyError::Artifact(_) => (StatusCode::INTERNAL_SERVER_ERROR, tag),
                    ProxyError::Synthesis(TtsError::MissingApiKey) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "missing_eleven_api_key")
                    }
                    ProxyError::Synthesis(_) | ProxyError::Fetch(_) => (StatusCode::BAD_GATEWAY, tag),
                };
                if status.is_server_error() {
                    tracing::error!(tag, error = %details, "Request failed");
                } else {
                    tracing::warn!(tag, error = %details, "Request rejected");
                }
                (status, Json(json!({ "error": tag, "details": details }))).into_response()
            }
        }
    }
}
