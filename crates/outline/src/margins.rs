//! Statistical header/footer detection.
//!
//! Running headers and footers recur at nearly identical vertical positions
//! on every page, so the modal bottom-edge of near-top blocks (and the modal
//! top-edge of near-bottom blocks) marks the furniture boundary even when
//! body text occasionally wanders into the edge bands.

use std::collections::BTreeMap;

use crate::source::PageSource;
use crate::types::Margins;
use crate::Error;

/// Crop applied to an edge whose candidate multiset came up empty.
pub const DEFAULT_CROP: f32 = 50.0;

/// Infer `(top, bottom)` crop heights from the first `sample_pages` pages.
///
/// For every non-empty block on a sampled page: a block starting within
/// `near_edge` points of the top edge votes its bottom edge into the header
/// multiset; otherwise, a block ending within `near_edge` points of the
/// bottom edge votes its distance-from-bottom into the footer multiset.
/// The header test runs first, so a block spanning both bands counts as
/// header furniture only.
///
/// Candidates are rounded to whole points before counting. Mode ties
/// resolve to the smallest candidate value.
pub fn detect<S: PageSource + ?Sized>(
    source: &S,
    sample_pages: usize,
    near_edge: f32,
) -> Result<Margins, Error> {
    let pages = source.page_count().min(sample_pages);

    let mut header: BTreeMap<i64, usize> = BTreeMap::new();
    let mut footer: BTreeMap<i64, usize> = BTreeMap::new();

    for page in 0..pages {
        let height = source.page_height(page)?;
        for block in source.blocks(page)? {
            if block.text.trim().is_empty() {
                continue;
            }
            if block.y0 < near_edge {
                *header.entry(block.y1.round() as i64).or_insert(0) += 1;
            } else if block.y1 > height - near_edge {
                // Distance from the bottom edge, in this page's own height,
                // so mixed page sizes vote in one unit.
                *footer.entry((height - block.y0).round() as i64).or_insert(0) += 1;
            }
        }
    }

    Ok(Margins {
        top: modal_value(&header).unwrap_or(DEFAULT_CROP),
        bottom: modal_value(&footer).unwrap_or(DEFAULT_CROP),
    })
}

/// The most frequent key, ties resolving to the smallest.
///
/// Iteration runs in ascending key order and a later key must be strictly
/// more frequent to displace the running mode.
fn modal_value(counts: &BTreeMap<i64, usize>) -> Option<f32> {
    let mut best: Option<(i64, usize)> = None;
    for (&value, &count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Block;

    /// Fixture source: one block list per page, all pages the same height
    /// unless overridden.
    struct FakeSource {
        heights: Vec<f32>,
        pages: Vec<Vec<Block>>,
    }

    impl FakeSource {
        fn new(pages: Vec<Vec<Block>>) -> Self {
            let heights = vec![842.0; pages.len()];
            Self { heights, pages }
        }
    }

    impl PageSource for FakeSource {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_height(&self, page: usize) -> Result<f32, Error> {
            Ok(self.heights[page])
        }

        fn blocks(&self, page: usize) -> Result<Vec<Block>, Error> {
            Ok(self.pages[page].clone())
        }

        fn clipped_text(&self, _page: usize, _top: f32, _bottom: f32) -> Result<String, Error> {
            Ok(String::new())
        }
    }

    fn block(y0: f32, y1: f32, text: &str) -> Block {
        Block {
            y0,
            y1,
            text: text.to_string(),
        }
    }

    // --- modal behavior ---

    #[test]
    fn test_repeated_header_wins() {
        // Three pages with a running header ending at y=57; one page where a
        // body paragraph intrudes into the top band.
        let pages = vec![
            vec![block(30.0, 57.0, "ACME Spec v2"), block(80.0, 400.0, "body")],
            vec![block(30.0, 57.0, "ACME Spec v2"), block(90.0, 410.0, "body")],
            vec![
                block(30.0, 57.0, "ACME Spec v2"),
                block(100.0, 130.0, "stray"),
            ],
        ];
        let m = detect(&FakeSource::new(pages), 5, 150.0).unwrap();
        assert_eq!(m.top, 57.0);
    }

    #[test]
    fn test_footer_distance_from_bottom() {
        // Footer block starting at y0=790 on an 842pt page: crop = 52.
        let pages = vec![
            vec![block(790.0, 820.0, "page 1")],
            vec![block(790.0, 820.0, "page 2")],
        ];
        let m = detect(&FakeSource::new(pages), 5, 150.0).unwrap();
        assert_eq!(m.bottom, 52.0);
    }

    #[test]
    fn test_mixed_page_heights_vote_together() {
        // Same physical footer distance (52pt) on pages of different heights.
        let mut source = FakeSource::new(vec![
            vec![block(790.0, 820.0, "p1")],
            vec![block(740.0, 770.0, "p2")],
        ]);
        source.heights = vec![842.0, 792.0];
        let m = detect(&source, 5, 150.0).unwrap();
        assert_eq!(m.bottom, 52.0);
    }

    #[test]
    fn test_tie_breaks_to_smallest() {
        let pages = vec![
            vec![block(30.0, 60.0, "a")],
            vec![block(30.0, 57.0, "b")],
            vec![block(30.0, 60.0, "c")],
            vec![block(30.0, 57.0, "d")],
        ];
        let m = detect(&FakeSource::new(pages), 5, 150.0).unwrap();
        assert_eq!(m.top, 57.0);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let pages = vec![vec![
            block(10.0, 40.0, "hdr"),
            block(700.0, 800.0, "ftr"),
        ]];
        let source = FakeSource::new(pages);
        let first = detect(&source, 5, 150.0).unwrap();
        let second = detect(&source, 5, 150.0).unwrap();
        assert_eq!(first, second);
    }

    // --- fallbacks and filters ---

    #[test]
    fn test_empty_bands_use_default() {
        // All content in the middle of the page.
        let pages = vec![vec![block(300.0, 500.0, "body only")]];
        let m = detect(&FakeSource::new(pages), 5, 150.0).unwrap();
        assert_eq!(m.top, DEFAULT_CROP);
        assert_eq!(m.bottom, DEFAULT_CROP);
    }

    #[test]
    fn test_zero_pages() {
        let m = detect(&FakeSource::new(vec![]), 5, 150.0).unwrap();
        assert_eq!(m.top, DEFAULT_CROP);
        assert_eq!(m.bottom, DEFAULT_CROP);
    }

    #[test]
    fn test_fewer_pages_than_sample() {
        let pages = vec![vec![block(30.0, 57.0, "hdr")]];
        let m = detect(&FakeSource::new(pages), 5, 150.0).unwrap();
        assert_eq!(m.top, 57.0);
    }

    #[test]
    fn test_whitespace_blocks_ignored() {
        let pages = vec![vec![block(30.0, 57.0, "   "), block(30.0, 61.0, "hdr")]];
        let m = detect(&FakeSource::new(pages), 5, 150.0).unwrap();
        assert_eq!(m.top, 61.0);
    }

    #[test]
    fn test_header_precedence_over_footer() {
        // A block spanning both bands on a short page counts as header only.
        let mut source = FakeSource::new(vec![vec![block(100.0, 160.0, "tall")]]);
        source.heights = vec![200.0];
        let m = detect(&source, 5, 150.0).unwrap();
        assert_eq!(m.top, 160.0);
        assert_eq!(m.bottom, DEFAULT_CROP);
    }

    #[test]
    fn test_sample_limit_respected() {
        // The header only appears on page 3, beyond the sample window.
        let pages = vec![
            vec![block(300.0, 400.0, "body")],
            vec![block(300.0, 400.0, "body")],
            vec![block(30.0, 57.0, "late header")],
        ];
        let m = detect(&FakeSource::new(pages), 2, 150.0).unwrap();
        assert_eq!(m.top, DEFAULT_CROP);
    }
}
