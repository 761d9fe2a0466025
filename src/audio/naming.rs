//! File-name resolution for stored audio artifacts.
//!
//! Caller-supplied name hints must already be a single path segment: a hint
//! carrying any directory portion is rejected outright rather than repaired,
//! since a traversal sequence in a hint signals malicious or buggy input.
//! Accepted hints are reduced to a filesystem-safe form by replacing every
//! character outside `[A-Za-z0-9_.-]` with an underscore.

use crate::audio::store::ArtifactError;
use std::ffi::OsStr;
use std::path::Path;
use time::OffsetDateTime;

/// Resolve a caller-supplied hint into a safe single-segment file name.
///
/// An absent or blank hint synthesizes `audio_<epoch-millis>.mp3`; a
/// non-empty hint that is not a single safe path segment fails with
/// [`ArtifactError::InvalidNameHint`].
pub fn resolve_file_name(name_hint: Option<&str>) -> Result<String, ArtifactError> {
    let Some(hint) = name_hint.map(str::trim).filter(|hint| !hint.is_empty()) else {
        return Ok(synthesized_name());
    };

    ensure_single_segment(hint)?;
    Ok(sanitize_segment(hint))
}

/// Verify that a name is exactly one path segment with no directory portion.
pub(crate) fn ensure_single_segment(name: &str) -> Result<(), ArtifactError> {
    match Path::new(name).file_name().and_then(OsStr::to_str) {
        Some(segment) if segment == name => Ok(()),
        _ => Err(ArtifactError::InvalidNameHint {
            hint: name.to_string(),
            reason: "name must be a single path segment",
        }),
    }
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn synthesized_name() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("audio_{millis}.mp3")
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn absent_hint_synthesizes_timestamped_name() {
        let pattern = Regex::new(r"^audio_\d+\.mp3$").expect("pattern");
        assert!(pattern.is_match(&resolve_file_name(None).expect("name")));
        assert!(pattern.is_match(&resolve_file_name(Some("  ")).expect("name")));
    }

    #[test]
    fn safe_hints_pass_through() {
        assert_eq!(
            resolve_file_name(Some("clip-01.mp3")).expect("name"),
            "clip-01.mp3"
        );
    }

    #[test]
    fn unsafe_characters_become_underscores() {
        assert_eq!(
            resolve_file_name(Some("clip one.mp3")).expect("name"),
            "clip_one.mp3"
        );
        assert_eq!(
            resolve_file_name(Some("voice över!.mp3")).expect("name"),
            "voice__ver_.mp3"
        );
    }

    #[test]
    fn traversal_hints_are_rejected_not_repaired() {
        for hint in ["../../etc/passwd", "a/b", "nested/clip.mp3", "clip.mp3/"] {
            let error = resolve_file_name(Some(hint)).expect_err(hint);
            assert!(matches!(error, ArtifactError::InvalidNameHint { .. }), "{hint}");
        }
    }

    #[test]
    fn dot_segments_are_rejected() {
        for hint in [".", ".."] {
            assert!(matches!(
                resolve_file_name(Some(hint)),
                Err(ArtifactError::InvalidNameHint { .. })
            ));
        }
    }
}
