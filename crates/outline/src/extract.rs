//! The extraction state machine.
//!
//! Pages are concatenated into one logical line stream (each page clipped to
//! the resolved margins). Every line is classified; a heading flushes the
//! open section into a record and re-seeds the heading slots, body lines
//! accumulate, and a final flush after the last page emits the trailing
//! section.

use crate::classify::Classifier;
use crate::merge::merge_fragments;
use crate::source::PageSource;
use crate::types::{ExtractOptions, HeadingLevel, Margins, Record, Variant};
use crate::Error;

/// The one mutable section open between two consecutive headings.
///
/// Heading slots survive flushes (a `1.1` record still carries its chapter
/// title); the body buffer does not.
#[derive(Debug, Default)]
struct Section {
    level1: Option<String>,
    level2: Option<String>,
    level3: Option<String>,
    body: Vec<String>,
}

impl Section {
    /// A section is open once any heading has been seen. Lines arriving
    /// before that have no section to attach to and are discarded.
    fn is_open(&self) -> bool {
        self.level1.is_some() || self.level2.is_some() || self.level3.is_some()
    }

    fn push_body(&mut self, line: &str) {
        self.body.push(line.to_string());
    }

    /// Snapshot the current state into a record and clear the body buffer.
    /// Returns `None` when no section is open.
    fn flush(&mut self, variant: Variant) -> Option<Record> {
        if !self.is_open() {
            self.body.clear();
            return None;
        }
        let content = merge_fragments(&self.body).join("\n");
        self.body.clear();

        Some(match variant {
            Variant::SingleLevel => Record::Flat {
                title: self.level1.clone().unwrap_or_default(),
                content,
            },
            Variant::Multilevel => Record::Nested {
                level1: self.level1.clone().unwrap_or_default(),
                level2: self.level2.clone().unwrap_or_default(),
                level3: self.level3.clone().unwrap_or_default(),
                content,
            },
        })
    }

    /// Install a new heading: slots strictly below `level` reset, the slot
    /// at `level` is overwritten, higher slots are kept.
    fn set_heading(&mut self, level: HeadingLevel, title: String) {
        match level {
            HeadingLevel::H1 => {
                self.level1 = Some(title);
                self.level2 = None;
                self.level3 = None;
            }
            HeadingLevel::H2 => {
                self.level2 = Some(title);
                self.level3 = None;
            }
            HeadingLevel::H3 => {
                self.level3 = Some(title);
            }
            HeadingLevel::None => {}
        }
    }
}

/// Run the state machine over every page of `source`, clipped to `margins`.
///
/// Records preserve document order; repeated identical heading text produces
/// separate records. A document with no heading-matching lines produces no
/// records at all.
pub(crate) fn run<S: PageSource + ?Sized>(
    source: &S,
    opts: &ExtractOptions,
    margins: Margins,
) -> Result<Vec<Record>, Error> {
    let classifier = Classifier::new(opts.variant, opts.max_heading_len);
    let mut section = Section::default();
    let mut records = Vec::new();

    for page in 0..source.page_count() {
        let text = source.clipped_text(page, margins.top, margins.bottom)?;
        for raw in text.split('\n') {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            match classifier.classify(line) {
                HeadingLevel::None => {
                    if section.is_open() {
                        section.push_body(line);
                    }
                }
                level => {
                    records.extend(section.flush(opts.variant));
                    section.set_heading(level, classifier.title(line));
                }
            }
        }
    }

    // The trailing section has no following heading to flush it.
    records.extend(section.flush(opts.variant));

    Ok(records)
}
