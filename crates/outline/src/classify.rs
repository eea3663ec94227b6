//! Heading classification by decimal-numbering prefix.
//!
//! A cheap, robust proxy for outline structure in documents that follow the
//! `1` / `1.1` / `1.1.1` numbering convention. The length guard keeps body
//! text that happens to start with a digit (dates, quantities) out of the
//! heading stream.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{HeadingLevel, Variant};

fn re_h1() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\s|$)").unwrap())
}

fn re_h2() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+(\s|$)").unwrap())
}

fn re_h3() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+(\s|$)").unwrap())
}

fn re_flat() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+){0,2}(\s|$)").unwrap())
}

fn re_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+){0,2}\s*").unwrap())
}

/// Assigns a [`HeadingLevel`] to trimmed, non-empty lines.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    variant: Variant,
    max_len: usize,
}

impl Classifier {
    pub fn new(variant: Variant, max_len: usize) -> Self {
        Self { variant, max_len }
    }

    /// Classify one line. Lines longer than the maximum heading length (in
    /// characters, not bytes) are always body content.
    pub fn classify(&self, line: &str) -> HeadingLevel {
        if line.chars().count() > self.max_len {
            return HeadingLevel::None;
        }
        match self.variant {
            Variant::SingleLevel => {
                if re_flat().is_match(line) {
                    HeadingLevel::H1
                } else {
                    HeadingLevel::None
                }
            }
            Variant::Multilevel => {
                if re_h3().is_match(line) {
                    HeadingLevel::H3
                } else if re_h2().is_match(line) {
                    HeadingLevel::H2
                } else if re_h1().is_match(line) {
                    HeadingLevel::H1
                } else {
                    HeadingLevel::None
                }
            }
        }
    }

    /// The title to store for a classified heading line.
    ///
    /// The single-level variant keeps the numbered line verbatim; the
    /// multilevel variant strips the numeric prefix.
    pub fn title(&self, line: &str) -> String {
        match self.variant {
            Variant::SingleLevel => line.to_string(),
            Variant::Multilevel => normalize(line),
        }
    }
}

/// Strip the leading `1` / `1.1` / `1.1.1` numbering and surrounding
/// whitespace, leaving the bare heading text.
pub fn normalize(line: &str) -> String {
    re_prefix().replace(line, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multilevel() -> Classifier {
        Classifier::new(Variant::Multilevel, 50)
    }

    fn flat() -> Classifier {
        Classifier::new(Variant::SingleLevel, 50)
    }

    // --- multilevel ordering ---

    #[test]
    fn test_level_ordering() {
        assert_eq!(multilevel().classify("1.1.1 Foo"), HeadingLevel::H3);
        assert_eq!(multilevel().classify("1.1 Foo"), HeadingLevel::H2);
        assert_eq!(multilevel().classify("1 Foo"), HeadingLevel::H1);
        assert_eq!(multilevel().classify("Foo"), HeadingLevel::None);
    }

    #[test]
    fn test_bare_numbers() {
        assert_eq!(multilevel().classify("3"), HeadingLevel::H1);
        assert_eq!(multilevel().classify("3.2"), HeadingLevel::H2);
        assert_eq!(multilevel().classify("3.2.1"), HeadingLevel::H3);
    }

    #[test]
    fn test_multi_digit_components() {
        assert_eq!(multilevel().classify("12.10 Index"), HeadingLevel::H2);
        assert_eq!(multilevel().classify("10.2.15 Detail"), HeadingLevel::H3);
    }

    #[test]
    fn test_prefix_requires_separator() {
        // No whitespace (or end) after the numbering: not a heading.
        assert_eq!(multilevel().classify("1.1Foo"), HeadingLevel::None);
        assert_eq!(multilevel().classify("1)"), HeadingLevel::None);
        assert_eq!(multilevel().classify("1. Foo"), HeadingLevel::None);
    }

    #[test]
    fn test_four_components_rejected() {
        // The fourth component sits where the separator is required.
        assert_eq!(multilevel().classify("1.1.1.1 Deep"), HeadingLevel::None);
    }

    // --- length guard ---

    #[test]
    fn test_length_guard() {
        let body = format!("1 {}", "x".repeat(49)); // 51 chars
        assert_eq!(multilevel().classify(&body), HeadingLevel::None);
        assert_eq!(flat().classify(&body), HeadingLevel::None);

        let heading = format!("1 {}", "x".repeat(48)); // exactly 50
        assert_eq!(multilevel().classify(&heading), HeadingLevel::H1);
    }

    #[test]
    fn test_length_guard_counts_chars_not_bytes() {
        // 2 + 48 CJK chars = 50 characters but far more than 50 bytes.
        let heading = format!("1 {}", "安".repeat(48));
        assert_eq!(multilevel().classify(&heading), HeadingLevel::H1);
    }

    // --- single-level variant ---

    #[test]
    fn test_flat_accepts_all_depths() {
        // Every depth collapses to the one flat heading type.
        assert_eq!(flat().classify("1 Intro"), HeadingLevel::H1);
        assert_eq!(flat().classify("1.1 Scope"), HeadingLevel::H1);
        assert_eq!(flat().classify("1.1.1 Detail"), HeadingLevel::H1);
        assert_eq!(flat().classify("7"), HeadingLevel::H1);
    }

    #[test]
    fn test_flat_rejects_non_numbered() {
        assert_eq!(flat().classify("Introduction"), HeadingLevel::None);
        assert_eq!(flat().classify("1.1.1.1 Deep"), HeadingLevel::None);
    }

    // --- titles ---

    #[test]
    fn test_title_normalized_for_multilevel() {
        assert_eq!(multilevel().title("1.1 Scope"), "Scope");
        assert_eq!(multilevel().title("2 总则"), "总则");
        assert_eq!(multilevel().title("3.2.1   Padded  "), "Padded");
    }

    #[test]
    fn test_title_verbatim_for_flat() {
        assert_eq!(flat().title("1.1 Scope"), "1.1 Scope");
    }

    #[test]
    fn test_normalize_bare_number() {
        assert_eq!(normalize("4"), "");
        assert_eq!(normalize("4 Requirements"), "Requirements");
    }
}
