//! Positioned text recovery from a page's content stream.
//!
//! A simplified PDF text-rendering state machine: enough of the text
//! operators to place each shown string at its page position, so that lines
//! can be reassembled top-to-bottom and cropped by vertical range. Glyph
//! metrics are approximated (no widths arrays); horizontal positions are
//! only used for within-line ordering and word-gap detection, so the
//! approximation is sufficient.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::ObjectId;

use super::backend;
use super::cleanup;
use crate::types::Block;
use crate::Error;

/// Two spans within this many points of the same baseline share a line.
const Y_TOLERANCE: f32 = 1.0;

/// Approximate character width as a fraction of font size.
const CHAR_WIDTH_RATIO: f32 = 0.5;

/// Horizontal gap (points) beyond which adjacent spans get a space.
const MIN_WORD_GAP: f32 = 1.5;

/// Portion of the font size extending above the baseline.
const ASCENT_RATIO: f32 = 0.8;

/// Portion of the font size extending below the baseline.
const DESCENT_RATIO: f32 = 0.2;

/// A vertical gap larger than this multiple of the line height starts a
/// new block.
const BLOCK_GAP_FACTOR: f32 = 1.4;

const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// A run of text at a baseline position, in PDF (bottom-up) coordinates.
#[derive(Debug, Clone)]
pub(crate) struct Span {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub size: f32,
}

/// An assembled text line in top-down coordinates (`y0` = top edge).
#[derive(Debug, Clone)]
pub(crate) struct Line {
    pub y0: f32,
    pub y1: f32,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Content-stream walker
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct TextState {
    matrix: [f32; 6],
    line_matrix: [f32; 6],
    size: f32,
    leading: f32,
    font_key: Vec<u8>,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            size: 0.0,
            leading: 0.0,
            font_key: Vec::new(),
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.matrix[4]
    }

    fn y(&self) -> f32 {
        self.matrix[5]
    }

    /// Rendered size accounting for the text matrix vertical scale.
    fn effective_size(&self) -> f32 {
        let scale = (self.matrix[1].powi(2) + self.matrix[3].powi(2)).sqrt();
        (self.size * scale).abs()
    }

    fn advance_x(&mut self, dx: f32) {
        self.matrix[4] += dx * self.matrix[0];
        self.matrix[5] += dx * self.matrix[1];
    }

    /// Td / TD / T*: translate the line matrix and restart the text matrix
    /// from it.
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.matrix = self.line_matrix;
    }
}

fn as_number(obj: &lopdf::Object) -> Option<f32> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f32),
        lopdf::Object::Real(f) => Some(*f),
        _ => None,
    }
}

/// Walk one page's content stream and collect positioned spans.
pub(crate) fn page_spans(
    doc: &lopdf::Document,
    page: ObjectId,
    encodings: &HashMap<Vec<u8>, String>,
) -> Result<Vec<Span>, Error> {
    let raw = doc
        .get_page_content(page)
        .map_err(|e| Error::Parse(format!("cannot get page content: {e}")))?;
    let content =
        Content::decode(&raw).map_err(|e| Error::Parse(format!("content stream decode: {e}")))?;

    let mut state = TextState::default();
    let mut spans: Vec<Span> = Vec::new();

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => {
                state.matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "ET" => {
                // Font state deliberately survives text objects; some
                // producers set the font once and reuse it.
            }
            "Tf" => {
                if operands.len() >= 2 {
                    if let lopdf::Object::Name(name) = &operands[0] {
                        state.font_key = name.clone();
                    }
                    if let Some(size) = as_number(&operands[1]) {
                        state.size = size;
                    }
                }
            }
            "Tm" => {
                let vals: Vec<f32> = operands.iter().take(6).filter_map(as_number).collect();
                if vals.len() == 6 {
                    state.matrix = [vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]];
                    state.line_matrix = state.matrix;
                }
            }
            "Td" => {
                if operands.len() >= 2 {
                    let tx = as_number(&operands[0]).unwrap_or(0.0);
                    let ty = as_number(&operands[1]).unwrap_or(0.0);
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                // Equivalent to: -ty TL; tx ty Td
                if operands.len() >= 2 {
                    let tx = as_number(&operands[0]).unwrap_or(0.0);
                    let ty = as_number(&operands[1]).unwrap_or(0.0);
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => {
                state.translate_line(0.0, -state.leading);
            }
            "TL" => {
                if let Some(v) = operands.first().and_then(as_number) {
                    state.leading = v;
                }
            }
            "Tj" => {
                if let Some(obj) = operands.first() {
                    show_string(obj, encodings, &mut state, &mut spans);
                }
            }
            "TJ" => {
                if let Some(lopdf::Object::Array(arr)) = operands.first() {
                    show_array(arr, encodings, &mut state, &mut spans);
                }
            }
            "'" => {
                state.translate_line(0.0, -state.leading);
                if let Some(obj) = operands.first() {
                    show_string(obj, encodings, &mut state, &mut spans);
                }
            }
            "\"" => {
                // Word/char spacing operands are ignored; move and show.
                if operands.len() >= 3 {
                    state.translate_line(0.0, -state.leading);
                    show_string(&operands[2], encodings, &mut state, &mut spans);
                }
            }
            _ => { /* non-text operator */ }
        }
    }

    Ok(spans)
}

fn decode_operand(
    obj: &lopdf::Object,
    encodings: &HashMap<Vec<u8>, String>,
    font_key: &[u8],
) -> String {
    match obj {
        lopdf::Object::String(bytes, _) => {
            backend::decode_show_text(bytes, encodings.get(font_key).map(String::as_str))
        }
        _ => String::new(),
    }
}

fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * CHAR_WIDTH_RATIO
}

fn show_string(
    obj: &lopdf::Object,
    encodings: &HashMap<Vec<u8>, String>,
    state: &mut TextState,
    spans: &mut Vec<Span>,
) {
    let text = decode_operand(obj, encodings, &state.font_key);
    if text.is_empty() {
        return;
    }
    let width = estimate_width(&text, state.size);
    spans.push(Span {
        x: state.x(),
        y: state.y(),
        width,
        size: state.effective_size(),
        text,
    });
    state.advance_x(width);
}

/// TJ: strings interleaved with kerning adjustments in thousandths of a
/// text-space unit. Large rightward adjustments become word gaps.
fn show_array(
    arr: &[lopdf::Object],
    encodings: &HashMap<Vec<u8>, String>,
    state: &mut TextState,
    spans: &mut Vec<Span>,
) {
    let mut buf = String::new();
    let mut start_x = state.x();
    let start_y = state.y();

    for elem in arr {
        match elem {
            lopdf::Object::String(_, _) => {
                let fragment = decode_operand(elem, encodings, &state.font_key);
                if buf.is_empty() {
                    start_x = state.x();
                }
                let dx = estimate_width(&fragment, state.size);
                buf.push_str(&fragment);
                state.advance_x(dx);
            }
            other => {
                if let Some(adj) = as_number(other) {
                    let dx = -adj / 1000.0 * state.size;
                    let gap_threshold = state.size * CHAR_WIDTH_RATIO * 0.3;
                    if dx > gap_threshold && !buf.is_empty() && !buf.ends_with(' ') {
                        buf.push(' ');
                    }
                    state.advance_x(dx);
                }
            }
        }
    }

    let trimmed = buf.trim_end();
    if trimmed.is_empty() {
        return;
    }
    spans.push(Span {
        x: start_x,
        y: start_y,
        width: estimate_width(trimmed, state.size),
        size: state.effective_size(),
        text: trimmed.to_string(),
    });
}

// ---------------------------------------------------------------------------
// Span -> line -> block assembly
// ---------------------------------------------------------------------------

/// True for scripts written without inter-word spaces; adjacent spans of
/// such text concatenate directly regardless of horizontal gap.
fn is_spaceless(c: char) -> bool {
    matches!(
        c as u32,
        // CJK Unified Ideographs (+ Extension A)
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        // Hiragana, Katakana
        | 0x3040..=0x30FF
        // Hangul Syllables
        | 0xAC00..=0xD7AF
        // CJK Symbols and Punctuation, Fullwidth Forms
        | 0x3000..=0x303F
        | 0xFF00..=0xFFEF
    )
}

/// Group spans sharing a baseline into [`Line`]s, converting to top-down
/// coordinates against `page_height`. Output is ordered top to bottom.
pub(crate) fn assemble_lines(mut spans: Vec<Span>, page_height: f32) -> Vec<Line> {
    if spans.is_empty() {
        return Vec::new();
    }

    // Top of page first, then left to right.
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut group: Vec<Span> = Vec::new();
    let mut group_y = spans[0].y;

    for span in spans {
        if !group.is_empty() && (span.y - group_y).abs() > Y_TOLERANCE {
            if let Some(line) = finish_line(std::mem::take(&mut group), page_height) {
                lines.push(line);
            }
        }
        if group.is_empty() {
            group_y = span.y;
        }
        group.push(span);
    }
    if let Some(line) = finish_line(group, page_height) {
        lines.push(line);
    }

    lines
}

/// Join one baseline group into a line, inserting spaces at word gaps
/// between non-CJK neighbors.
fn finish_line(mut group: Vec<Span>, page_height: f32) -> Option<Line> {
    group.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let mut text = String::new();
    let mut prev_end: Option<f32> = None;
    let mut prev_char: Option<char> = None;

    for span in &group {
        if let Some(end) = prev_end {
            let gap = span.x - end;
            let cjk_boundary = prev_char.map(is_spaceless).unwrap_or(false)
                || span.text.chars().next().map(is_spaceless).unwrap_or(false);
            if gap > MIN_WORD_GAP && !cjk_boundary && !text.ends_with(' ') {
                text.push(' ');
            }
        }
        text.push_str(&span.text);
        prev_end = Some(span.x + span.width);
        prev_char = span.text.chars().next_back();
    }

    let text = cleanup::clean_line(&text);
    if text.is_empty() {
        return None;
    }

    let baseline = group[0].y;
    let size = group
        .iter()
        .map(|s| s.size)
        .fold(0.0_f32, f32::max)
        .max(1.0);

    Some(Line {
        y0: page_height - (baseline + size * ASCENT_RATIO),
        y1: page_height - (baseline - size * DESCENT_RATIO),
        text,
    })
}

/// Group consecutive lines into vertical blocks: a gap larger than
/// [`BLOCK_GAP_FACTOR`] line heights starts a new block. Block text joins
/// its lines with `'\n'`.
pub(crate) fn group_blocks(lines: &[Line]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();

    for line in lines {
        let height = (line.y1 - line.y0).max(1.0);
        match blocks.last_mut() {
            Some(block) if line.y0 - block.y1 <= BLOCK_GAP_FACTOR * height => {
                block.y1 = block.y1.max(line.y1);
                block.text.push('\n');
                block.text.push_str(&line.text);
            }
            _ => blocks.push(Block {
                y0: line.y0,
                y1: line.y1,
                text: line.text.clone(),
            }),
        }
    }

    blocks
}
