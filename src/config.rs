use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Default ElevenLabs text-to-speech endpoint.
pub const DEFAULT_ELEVEN_BASE_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";
/// Default TTS model identifier sent when a request omits one.
pub const DEFAULT_TTS_MODEL_ID: &str = "eleven_multilingual_v2";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the memevox server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the upstream meme knowledge-base API.
    pub kym_api_url: String,
    /// ElevenLabs API key; TTS requests fail with a tagged error when absent.
    pub eleven_api_key: Option<String>,
    /// Base URL of the ElevenLabs text-to-speech API.
    pub eleven_base_url: String,
    /// Shared secret required in `x-api-key`; the gate is disabled when unset.
    pub proxy_api_key: Option<String>,
    /// Directory where generated audio artifacts are persisted.
    pub audio_dir: PathBuf,
    /// Optional base URL used when building public audio locators.
    pub public_base_url: Option<String>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Result count applied to search requests that omit `limit`.
    pub search_default_limit: usize,
    /// Upper bound applied to caller-supplied search limits.
    pub search_max_limit: usize,
    /// TTS model identifier applied to requests that omit `model_id`.
    pub tts_model_id: String,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            kym_api_url: load_env("KYM_API_URL")?,
            eleven_api_key: load_env_optional("ELEVEN_API_KEY"),
            eleven_base_url: load_env_optional("ELEVEN_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ELEVEN_BASE_URL.to_string()),
            proxy_api_key: load_env_optional("PROXY_API_KEY"),
            audio_dir: load_env_optional("AUDIO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("audio")),
            public_base_url: load_env_optional("PUBLIC_BASE_URL")
                .map(|value| value.trim_end_matches('/').to_string()),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            search_default_limit: load_env_optional("SEARCH_DEFAULT_LIMIT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SEARCH_DEFAULT_LIMIT".into()))
                })
                .transpose()?
                .unwrap_or(10),
            search_max_limit: load_env_optional("SEARCH_MAX_LIMIT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SEARCH_MAX_LIMIT".into()))
                })
                .transpose()?
                .unwrap_or(50),
            tts_model_id: load_env_optional("TTS_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_TTS_MODEL_ID.to_string()),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        kym_api_url = %config.kym_api_url,
        audio_dir = %config.audio_dir.display(),
        server_port = ?config.server_port,
        has_eleven_api_key = config.eleven_api_key.is_some(),
        gate_enabled = config.proxy_api_key.is_some(),
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
