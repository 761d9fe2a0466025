//! HTTP client wrapper for the upstream meme knowledge-base API.

use crate::config::get_config;
use crate::kym::types::{EntryTarget, KymError, MemeEntry};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;

/// Abstraction over the upstream meme API used by the service layer.
#[async_trait]
pub trait MemeSource: Send + Sync {
    /// Run a keyword search, returning at most `limit` upstream result records.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Value>, KymError>;

    /// Fetch the full entry the target resolves to.
    async fn fetch_entry(&self, target: &EntryTarget) -> Result<MemeEntry, KymError>;
}

/// Lightweight HTTP client for meme API operations.
pub struct KymClient {
    client: Client,
    base_url: String,
}

impl KymClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, KymError> {
        Self::with_base_url(&get_config().kym_api_url)
    }

    /// Construct a client against an explicit base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, KymError> {
        let client = Client::builder()
            .user_agent("memevox/0.2")
            .build()?;
        let base_url = normalize_base_url(base_url).map_err(KymError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized meme API HTTP client");

        Ok(Self { client, base_url })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, format_endpoint(&self.base_url, path))
    }
}

#[async_trait]
impl MemeSource for KymClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Value>, KymError> {
        let response = self
            .request(Method::GET, "search")
            .query(&[("q", query), ("limit", &limit.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = KymError::UnexpectedStatus { status, body };
            tracing::error!(query, error = %error, "Meme search failed");
            return Err(error);
        }

        let results: Vec<Value> = response.json().await?;
        tracing::debug!(query, results = results.len(), "Meme search completed");
        Ok(results)
    }

    async fn fetch_entry(&self, target: &EntryTarget) -> Result<MemeEntry, KymError> {
        let slug = target.slug()?;
        let response = self
            .request(Method::GET, &format!("memes/{}", urlencoding::encode(slug)))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = KymError::UnexpectedStatus { status, body };
            tracing::error!(slug, error = %error, "Entry fetch failed");
            return Err(error);
        }

        let mut entry: MemeEntry = response.json().await?;
        if entry.link.is_none() {
            entry.link = Some(target.canonical_url()?);
        }
        Ok(entry)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
