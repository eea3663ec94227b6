use crate::types::Block;
use crate::Error;

/// Abstraction over the rendering collaborator that supplies page text.
///
/// This trait exists so that the detection and extraction logic can be
/// tested against in-memory fixtures without a real document backend.
/// Pages are addressed by zero-based index in document order.
pub trait PageSource {
    /// Total number of pages in the document.
    fn page_count(&self) -> usize;

    /// Height of the given page in points.
    fn page_height(&self, page: usize) -> Result<f32, Error>;

    /// Text blocks of the given page with top-down vertical extents.
    /// Consumed by margin detection only.
    fn blocks(&self, page: usize) -> Result<Vec<Block>, Error>;

    /// The page's text restricted to the vertical band between `top` points
    /// from the top edge and `bottom` points from the bottom edge, one text
    /// line per `'\n'`-separated line, in top-to-bottom order.
    fn clipped_text(&self, page: usize, top: f32, bottom: f32) -> Result<String, Error>;
}
