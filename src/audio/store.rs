//! Persistence for generated audio artifacts.

use crate::audio::naming;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving or persisting an audio artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Caller-supplied output name is unsafe; nothing was written.
    #[error("Invalid output name {hint:?}: {reason}")]
    InvalidNameHint {
        /// The offending caller-supplied value.
        hint: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// The persistence medium rejected the operation.
    #[error("Audio storage failed: {0}")]
    Storage(#[from] std::io::Error),
}

/// A successfully persisted artifact.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    /// Absolute path of the written file, a strict descendant of the root.
    pub path: PathBuf,
    /// Resolved file name, safe to embed in a URL path segment.
    pub file_name: String,
}

impl StoredArtifact {
    /// Build the public URL the stored file is served under.
    pub fn public_locator(&self, base_url: &str) -> String {
        format!(
            "{}/audio/{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&self.file_name)
        )
    }
}

/// Write-once binary store rooted at a fixed audio directory.
///
/// Concurrent writes resolving to the same file name race last-write-wins;
/// the store provides no per-name locking or deduplication.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist `content` under a name resolved from `name_hint`.
    ///
    /// The storage root is created on first use; a rejected hint never
    /// touches the filesystem.
    pub async fn store(
        &self,
        content: &[u8],
        name_hint: Option<&str>,
    ) -> Result<StoredArtifact, ArtifactError> {
        let file_name = naming::resolve_file_name(name_hint)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.resolve_within_root(&file_name)?;
        tokio::fs::write(&path, content).await?;
        tracing::debug!(file = %file_name, bytes = content.len(), "Audio artifact written");
        Ok(StoredArtifact { path, file_name })
    }

    /// Read back a previously stored artifact by its resolved file name.
    pub async fn open(&self, file_name: &str) -> Result<Vec<u8>, ArtifactError> {
        naming::ensure_single_segment(file_name)?;
        let path = self.resolve_within_root(file_name)?;
        Ok(tokio::fs::read(&path).await?)
    }

    /// Join a resolved name onto the canonical root, verifying containment.
    ///
    /// The name has already been reduced to a safe segment; this check is an
    /// independent guard against path semantics the character filter does not
    /// anticipate, and rejects rather than writes when it fails.
    fn resolve_within_root(&self, file_name: &str) -> Result<PathBuf, ArtifactError> {
        let canonical_root = self.root.canonicalize()?;
        let candidate = canonical_root.join(file_name);
        if candidate == canonical_root || !candidate.starts_with(&canonical_root) {
            return Err(ArtifactError::InvalidNameHint {
                hint: file_name.to_string(),
                reason: "resolved path escapes the storage root",
            });
        }
        Ok(candidate)
    }
}

/// Shorthand for checking an I/O failure kind behind [`ArtifactError`].
pub fn is_not_found(error: &ArtifactError) -> bool {
    matches!(
        error,
        ArtifactError::Storage(io) if io.kind() == std::io::ErrorKind::NotFound
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ArtifactStore {
        ArtifactStore::new(dir.path().join("audio"))
    }

    #[tokio::test]
    async fn stores_and_reads_back_bytes() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        let artifact = store
            .store(b"mp3-bytes", Some("clip one.mp3"))
            .await
            .expect("store");

        assert_eq!(artifact.file_name, "clip_one.mp3");
        let read_back = store.open("clip_one.mp3").await.expect("open");
        assert_eq!(read_back, b"mp3-bytes");
    }

    #[tokio::test]
    async fn traversal_hint_fails_without_touching_disk() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        let error = store
            .store(b"payload", Some("../secret.mp3"))
            .await
            .expect_err("traversal must fail");

        assert!(matches!(error, ArtifactError::InvalidNameHint { .. }));
        // the root is only created once a name resolves, so nothing exists yet
        assert!(!dir.path().join("audio").exists());
        assert!(!dir.path().join("secret.mp3").exists());
    }

    #[tokio::test]
    async fn stored_path_is_a_strict_descendant_of_the_root() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        let artifact = store.store(b"x", Some("clip.mp3")).await.expect("store");

        let canonical_root = dir.path().join("audio").canonicalize().expect("root");
        assert!(artifact.path.starts_with(&canonical_root));
        assert_ne!(artifact.path, canonical_root);
    }

    #[tokio::test]
    async fn hintless_writes_in_quick_succession_do_not_fail() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        let pattern = Regex::new(r"^audio_\d+\.mp3$").expect("pattern");

        let first = store.store(b"one", None).await.expect("first write");
        let second = store.store(b"two", None).await.expect("second write");

        assert!(pattern.is_match(&first.file_name));
        assert!(pattern.is_match(&second.file_name));
    }

    #[tokio::test]
    async fn same_name_overwrites_last_write_wins() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        store.store(b"first", Some("clip.mp3")).await.expect("first");
        store.store(b"second", Some("clip.mp3")).await.expect("second");

        assert_eq!(store.open("clip.mp3").await.expect("open"), b"second");
    }

    #[tokio::test]
    async fn open_rejects_names_with_path_components() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        store.store(b"x", Some("clip.mp3")).await.expect("store");

        let error = store.open("../audio/clip.mp3").await.expect_err("traversal");
        assert!(matches!(error, ArtifactError::InvalidNameHint { .. }));
    }

    #[tokio::test]
    async fn missing_files_surface_as_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        store.store(b"x", Some("present.mp3")).await.expect("store");

        let error = store.open("absent.mp3").await.expect_err("missing file");
        assert!(is_not_found(&error));
    }

    #[test]
    fn public_locator_percent_encodes_the_file_name() {
        let artifact = StoredArtifact {
            path: PathBuf::from("/srv/audio/clip_one.mp3"),
            file_name: "clip_one.mp3".into(),
        };
        assert_eq!(
            artifact.public_locator("http://localhost:3000/"),
            "http://localhost:3000/audio/clip_one.mp3"
        );

        let artifact = StoredArtifact {
            path: PathBuf::from("/srv/audio/100%.mp3"),
            file_name: "100%.mp3".into(),
        };
        assert_eq!(
            artifact.public_locator("http://localhost:3000"),
            "http://localhost:3000/audio/100%25.mp3"
        );
    }
}
