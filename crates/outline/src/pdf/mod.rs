//! lopdf-backed [`PageSource`] implementation.
//!
//! The document handle is only held while the source is being built: every
//! page's text is recovered and positioned up front, then the handle is
//! dropped (also on error, since the handle never escapes construction).
//! After that the source is plain in-memory data, cheap to query and safe
//! to share across threads.

mod backend;
mod cleanup;
mod textpage;

use lopdf::ObjectId;

use crate::source::PageSource;
use crate::types::{Block, DocumentInfo};
use crate::Error;

/// One page's materialized text: its height and its lines in top-to-bottom
/// order (top-down coordinates).
#[derive(Debug)]
struct PageText {
    height: f32,
    lines: Vec<textpage::Line>,
}

/// A paginated document read from a PDF file.
#[derive(Debug)]
pub struct PdfSource {
    pages: Vec<PageText>,
    info: DocumentInfo,
}

impl PdfSource {
    /// Read a PDF from disk.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Read a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let doc = backend::load_bytes(data)?;
        Self::build(&doc)
    }

    fn build(doc: &lopdf::Document) -> Result<Self, Error> {
        let info = backend::document_info(doc);
        let page_ids = backend::ordered_pages(doc);

        let mut pages = Vec::with_capacity(page_ids.len());
        for page_id in page_ids {
            pages.push(Self::build_page(doc, page_id)?);
        }

        Ok(Self { pages, info })
    }

    fn build_page(doc: &lopdf::Document, page_id: ObjectId) -> Result<PageText, Error> {
        let (_, height) = backend::page_dimensions(doc, page_id)?;
        let encodings = backend::page_font_encodings(doc, page_id);
        let spans = textpage::page_spans(doc, page_id, &encodings)?;
        Ok(PageText {
            height,
            lines: textpage::assemble_lines(spans, height),
        })
    }

    /// Document metadata captured at load time.
    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    fn page(&self, page: usize) -> Result<&PageText, Error> {
        self.pages
            .get(page)
            .ok_or_else(|| Error::Parse(format!("page index {page} out of range")))
    }
}

impl PageSource for PdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_height(&self, page: usize) -> Result<f32, Error> {
        Ok(self.page(page)?.height)
    }

    fn blocks(&self, page: usize) -> Result<Vec<Block>, Error> {
        Ok(textpage::group_blocks(&self.page(page)?.lines))
    }

    fn clipped_text(&self, page: usize, top: f32, bottom: f32) -> Result<String, Error> {
        let page = self.page(page)?;
        let floor = page.height - bottom;

        let kept: Vec<&str> = page
            .lines
            .iter()
            .filter(|line| {
                // A line belongs to the clip region when its vertical
                // midpoint falls inside it.
                let mid = 0.5 * (line.y0 + line.y1);
                mid >= top && mid <= floor
            })
            .map(|line| line.text.as_str())
            .collect();

        Ok(kept.join("\n"))
    }
}
