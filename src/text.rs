//! Clean-text extraction from scraped entries.
//!
//! Upstream sections carry raw HTML fragments interleaved with media
//! references and wiki-style citation markers. This module flattens an entry
//! into plain text: one `##`-headed block per section, HTML tags and
//! `[n]` citations stripped, whitespace runs collapsed. Extraction is pure
//! and total; malformed or missing structure yields an empty string rather
//! than an error.

use crate::kym::{MemeEntry, MemeSection};
use regex::Regex;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid pattern"));
static CITATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").expect("valid pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid pattern"));

/// Flatten an entry into clean plain text.
///
/// Returns the empty string when the entry has no section list.
pub fn extract_clean_text(entry: &MemeEntry) -> String {
    match entry.sections.as_deref() {
        Some(sections) => clean_sections(sections),
        None => String::new(),
    }
}

/// Flatten an ordered section list into clean plain text.
pub fn clean_sections(sections: &[MemeSection]) -> String {
    sections
        .iter()
        .map(section_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Strip markup from a single fragment.
///
/// Tag and citation removal run before whitespace collapsing: both removals
/// can leave adjacent whitespace behind that still needs folding.
pub fn clean_fragment(raw: &str) -> String {
    let stripped = HTML_TAG.replace_all(raw, "");
    let stripped = CITATION.replace_all(&stripped, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

fn section_block(section: &MemeSection) -> String {
    let fragments: Vec<String> = section
        .contents
        .iter()
        .filter_map(|item| item.as_text())
        .map(clean_fragment)
        .filter(|fragment| !fragment.is_empty())
        .collect();

    format!("## {}\n{}", section.title, fragments.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kym::SectionContent;
    use serde_json::json;

    fn entry_with_sections(sections: Vec<MemeSection>) -> MemeEntry {
        MemeEntry {
            title: Some("Test".into()),
            link: None,
            sections: Some(sections),
            extra: serde_json::Map::new(),
        }
    }

    fn section(title: &str, contents: Vec<SectionContent>) -> MemeSection {
        MemeSection {
            title: title.into(),
            contents,
        }
    }

    #[test]
    fn strips_tags_citations_and_collapses_whitespace() {
        let entry = entry_with_sections(vec![section(
            "Origin",
            vec![SectionContent::Text("<b>Hello</b>  world [1]".into())],
        )]);

        assert_eq!(extract_clean_text(&entry), "## Origin\nHello world");
    }

    #[test]
    fn missing_section_list_yields_empty_string() {
        let entry = MemeEntry {
            title: None,
            link: None,
            sections: None,
            extra: serde_json::Map::new(),
        };
        assert_eq!(extract_clean_text(&entry), "");
    }

    #[test]
    fn empty_section_list_yields_empty_string() {
        assert_eq!(extract_clean_text(&entry_with_sections(vec![])), "");
    }

    #[test]
    fn non_textual_items_are_skipped() {
        let entry = entry_with_sections(vec![section(
            "Spread",
            vec![
                SectionContent::Other(json!({"image": "https://example.org/a.jpg"})),
                SectionContent::Text("Spread across <i>forums</i>".into()),
                SectionContent::Other(json!(42)),
            ],
        )]);

        assert_eq!(extract_clean_text(&entry), "## Spread\nSpread across forums");
    }

    #[test]
    fn section_with_no_surviving_fragments_keeps_its_heading() {
        let entry = entry_with_sections(vec![section(
            "Gallery",
            vec![
                SectionContent::Text("<img src=\"a.jpg\">".into()),
                SectionContent::Text("   ".into()),
                SectionContent::Other(json!(null)),
            ],
        )]);

        assert_eq!(extract_clean_text(&entry), "## Gallery\n");
    }

    #[test]
    fn sections_and_fragments_join_with_blank_lines() {
        let entry = entry_with_sections(vec![
            section(
                "Origin",
                vec![
                    SectionContent::Text("First  paragraph".into()),
                    SectionContent::Text("Second\tparagraph [12]".into()),
                ],
            ),
            section("Spread", vec![SectionContent::Text("Later on".into())]),
        ]);

        assert_eq!(
            extract_clean_text(&entry),
            "## Origin\nFirst paragraph\n\nSecond paragraph\n\n## Spread\nLater on"
        );
    }

    #[test]
    fn output_is_free_of_tags_and_citations() {
        let entry = entry_with_sections(vec![section(
            "About",
            vec![SectionContent::Text(
                "<p>Alpha [1] <a href=\"x\">beta</a> [23]</p> gamma".into(),
            )],
        )]);

        let cleaned = extract_clean_text(&entry);
        assert!(!HTML_TAG.is_match(&cleaned));
        assert!(!CITATION.is_match(&cleaned));
        assert_eq!(cleaned, "## About\nAlpha beta gamma");
    }

    #[test]
    fn extraction_is_deterministic() {
        let entry = entry_with_sections(vec![section(
            "Origin",
            vec![SectionContent::Text("<b>Same</b> input [7]".into())],
        )]);

        assert_eq!(extract_clean_text(&entry), extract_clean_text(&entry));
    }

    #[test]
    fn citation_stripping_only_targets_integer_markers() {
        assert_eq!(clean_fragment("keep [not a citation] drop [42]"), "keep [not a citation] drop");
    }
}
