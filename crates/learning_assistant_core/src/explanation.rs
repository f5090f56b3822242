//! crates/learning_assistant_core/src/explanation.rs
//!
//! Turns raw generated text into ordered, labeled sections.

use crate::domain::ExplanationSection;
use regex::Regex;
use std::sync::LazyLock;

/// Headings longer than this are cut.
pub const MAX_HEADING_CHARS: usize = 64;

// Two or more line breaks; the blank lines in between may hold spaces or tabs.
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").expect("valid blank-line pattern"));

/// Splits `raw` into sections. Never fails: input without any text yields a
/// single "Summary" section carrying the original input.
pub fn parse_explanation(raw: &str) -> Vec<ExplanationSection> {
    let normalized = raw.replace("\r\n", "\n");

    let sections: Vec<ExplanationSection> = BLANK_LINES
        .split(normalized.trim())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(index, part)| match part.split_once('\n') {
            Some((first, rest)) => ExplanationSection::new(truncate_heading(first.trim()), rest),
            None => ExplanationSection::new(format!("Section {}", index + 1), part),
        })
        .collect();

    if sections.is_empty() {
        return vec![ExplanationSection::new("Summary", raw)];
    }
    sections
}

fn truncate_heading(line: &str) -> String {
    line.chars().take(MAX_HEADING_CHARS).collect()
}

/// Renders sections into one string suitable for text-to-speech.
pub fn speech_text(sections: &[ExplanationSection]) -> String {
    sections
        .iter()
        .map(|section| format!("{}. {}", section.heading, section.content))
        .collect::<Vec<_>>()
        .join(". ")
}
