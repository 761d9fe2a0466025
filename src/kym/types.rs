//! Shared types used by the meme knowledge-base client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Canonical entry URL prefix used when expanding bare slugs.
pub const CANONICAL_ENTRY_BASE: &str = "https://knowyourmeme.com/memes";

/// Errors returned while talking to the upstream meme API.
#[derive(Debug, Error)]
pub enum KymError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid meme API URL: {0}")]
    InvalidUrl(String),
    /// Entry locator could not be reduced to a slug.
    #[error("Unable to derive an entry slug from {0:?}")]
    InvalidTarget(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Upstream responded with an unexpected status code.
    #[error("Unexpected meme API response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the upstream.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// A single entry fetched from the upstream meme knowledge base.
///
/// Only the fields the proxy inspects are typed; everything else the upstream
/// sends (`image`, `views`, `tags`, ...) is carried in `extra` so the detail
/// endpoint can echo the entry unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemeEntry {
    /// Entry title as reported by the upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Canonical entry URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Ordered rich-text sections; absent for stub entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<MemeSection>>,
    /// Untyped upstream fields preserved for passthrough.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One titled section of an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemeSection {
    /// Section heading, trusted to be single-line upstream data.
    #[serde(default)]
    pub title: String,
    /// Mixed content items; only textual ones feed clean-text extraction.
    #[serde(default)]
    pub contents: Vec<SectionContent>,
}

/// Content item within a section.
///
/// Upstream sections interleave raw text with embedded media references;
/// anything that is not a plain string is kept opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionContent {
    /// A rich-text fragment eligible for extraction.
    Text(String),
    /// Non-textual item (embedded media, structured data), skipped silently.
    Other(Value),
}

impl SectionContent {
    /// Return the textual payload when this item is a string fragment.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Other(_) => None,
        }
    }
}

/// Locator for a single entry, as supplied by the caller.
#[derive(Debug, Clone)]
pub enum EntryTarget {
    /// Bare entry slug, e.g. `shrek`.
    Slug(String),
    /// Full entry URL, e.g. `https://knowyourmeme.com/memes/shrek`.
    Url(String),
}

impl EntryTarget {
    /// The raw caller-supplied value, used for titles and diagnostics.
    pub fn label(&self) -> &str {
        match self {
            Self::Slug(slug) => slug,
            Self::Url(url) => url,
        }
    }

    /// Reduce the target to the slug the upstream API is keyed by.
    ///
    /// URLs resolve to their trailing non-empty path segment; a URL with no
    /// usable segment is rejected rather than guessed at.
    pub fn slug(&self) -> Result<&str, KymError> {
        match self {
            Self::Slug(slug) => {
                let trimmed = slug.trim();
                if trimmed.is_empty() {
                    Err(KymError::InvalidTarget(slug.clone()))
                } else {
                    Ok(trimmed)
                }
            }
            Self::Url(url) => url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|segment| !segment.is_empty() && !segment.contains(':'))
                .ok_or_else(|| KymError::InvalidTarget(url.clone())),
        }
    }

    /// Canonical public URL for the entry.
    pub fn canonical_url(&self) -> Result<String, KymError> {
        match self {
            Self::Url(url) => Ok(url.clone()),
            Self::Slug(_) => Ok(format!("{CANONICAL_ENTRY_BASE}/{}", self.slug()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_targets_pass_through_trimmed() {
        let target = EntryTarget::Slug(" shrek ".into());
        assert_eq!(target.slug().expect("slug"), "shrek");
    }

    #[test]
    fn url_targets_reduce_to_trailing_segment() {
        let target = EntryTarget::Url("https://knowyourmeme.com/memes/doge/".into());
        assert_eq!(target.slug().expect("slug"), "doge");
    }

    #[test]
    fn bare_scheme_urls_are_rejected() {
        let target = EntryTarget::Url("https://".into());
        assert!(matches!(target.slug(), Err(KymError::InvalidTarget(_))));
    }

    #[test]
    fn canonical_url_expands_slugs() {
        let target = EntryTarget::Slug("doge".into());
        assert_eq!(
            target.canonical_url().expect("url"),
            "https://knowyourmeme.com/memes/doge"
        );
    }

    #[test]
    fn section_content_distinguishes_text_from_media() {
        let parsed: Vec<SectionContent> = serde_json::from_str(
            r#"["plain text", {"image": "https://example.org/a.jpg"}, 42]"#,
        )
        .expect("mixed contents");

        assert_eq!(parsed[0].as_text(), Some("plain text"));
        assert!(parsed[1].as_text().is_none());
        assert!(parsed[2].as_text().is_none());
    }

    #[test]
    fn entry_round_trips_unknown_fields() {
        let raw = r#"{"title":"Doge","link":"https://knowyourmeme.com/memes/doge","views":123,"tags":["dog"]}"#;
        let entry: MemeEntry = serde_json::from_str(raw).expect("entry");
        assert_eq!(entry.title.as_deref(), Some("Doge"));
        assert_eq!(entry.extra["views"], 123);

        let echoed = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(echoed["tags"][0], "dog");
    }
}
