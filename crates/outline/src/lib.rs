//! Structured record extraction for numbered, outline-structured documents.
//!
//! Turns a paginated document's raw per-page text into hierarchically
//! labeled records (heading levels 1-3 plus body content), optionally
//! stripping running headers/footers first, either at fixed offsets or at
//! offsets inferred from the document itself.
//!
//! # Pipeline
//!
//! ```text
//! pages  ->  margins  ->  clipped lines  ->  headings  ->  records
//!  (PageSource)  (margins)      (extract)      (classify)    (merge)
//! ```
//!
//! Every side effect lives behind the [`PageSource`] trait; the detection
//! and extraction stages are pure transformations over its output, so the
//! whole pipeline can be driven by in-memory fixtures in tests. The bundled
//! [`pdf::PdfSource`] implements the trait over lopdf.
//!
//! Extraction is single-threaded and strictly page-ordered, because section
//! state carries across page boundaries. Runs over *different* documents
//! share nothing and may be parallelized freely.
//!
//! ```ignore
//! use outline::{extract_file, ExtractOptions, MarginSpec};
//!
//! let opts = ExtractOptions {
//!     margins: MarginSpec::Auto,
//!     ..Default::default()
//! };
//! let records = extract_file("spec.pdf", &opts)?;
//! ```

pub mod classify;
mod extract;
pub mod margins;
pub mod merge;
pub mod pdf;
mod source;
mod types;

pub use pdf::PdfSource;
pub use source::PageSource;
pub use types::{
    Block, DocumentInfo, ExtractOptions, HeadingLevel, Margins, MarginSpec, Record, Variant,
    POINTS_PER_CM,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract structured records from a page source.
///
/// Validates the options, resolves the crop heights (none, fixed, or
/// auto-detected from the first pages), then runs the heading state machine
/// over every page. A document with no pages or no heading-matching lines
/// yields an empty list, not an error.
pub fn extract<S: PageSource + ?Sized>(
    source: &S,
    opts: &ExtractOptions,
) -> Result<Vec<Record>, Error> {
    opts.validate()?;

    let margins = match opts.margins {
        MarginSpec::None => Margins::NONE,
        MarginSpec::Fixed { top, bottom } => Margins { top, bottom },
        MarginSpec::Auto => margins::detect(source, opts.sample_pages, opts.near_edge)?,
    };

    extract::run(source, opts, margins)
}

/// One-shot margin detection for callers that only want the crop heights.
pub fn detect_margins<S: PageSource + ?Sized>(
    source: &S,
    sample_pages: usize,
    near_edge: f32,
) -> Result<Margins, Error> {
    margins::detect(source, sample_pages, near_edge)
}

/// Convenience: open a PDF file and extract records from it.
pub fn extract_file<P: AsRef<std::path::Path>>(
    path: P,
    opts: &ExtractOptions,
) -> Result<Vec<Record>, Error> {
    let source = PdfSource::open(path)?;
    extract(&source, opts)
}

/// Convenience: extract records from PDF bytes already in memory.
pub fn extract_bytes(data: &[u8], opts: &ExtractOptions) -> Result<Vec<Record>, Error> {
    let source = PdfSource::from_bytes(data)?;
    extract(&source, opts)
}
