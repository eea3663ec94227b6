//! Thin lopdf access layer: document loading, page geometry, metadata, and
//! best-effort text decoding. Everything here works on a borrowed
//! [`lopdf::Document`]; the handle itself is owned (and dropped) by
//! [`super::PdfSource`].

use std::collections::HashMap;

use lopdf::ObjectId;

use crate::types::DocumentInfo;
use crate::Error;

/// Parse a PDF from an in-memory byte slice, rejecting encrypted files.
pub fn load_bytes(data: &[u8]) -> Result<lopdf::Document, Error> {
    let doc = lopdf::Document::load_mem(data).map_err(|e| Error::Parse(e.to_string()))?;
    if doc.is_encrypted() {
        return Err(Error::Encrypted);
    }
    Ok(doc)
}

/// Page object ids in ascending page-number order.
pub fn ordered_pages(doc: &lopdf::Document) -> Vec<ObjectId> {
    // get_pages() keys are 1-based page numbers in a BTreeMap, so the
    // values already come out in document order.
    doc.get_pages().into_values().collect()
}

/// Page `(width, height)` from the MediaBox `[llx, lly, urx, ury]`,
/// following Parent links for inherited boxes.
pub fn page_dimensions(doc: &lopdf::Document, page: ObjectId) -> Result<(f32, f32), Error> {
    let page_dict = doc
        .get_object(page)
        .and_then(|obj| obj.as_dict())
        .map_err(|e| Error::Parse(format!("cannot read page dictionary: {e}")))?;

    let media_box = find_media_box(doc, page_dict)
        .ok_or_else(|| Error::Parse("MediaBox not found for page".into()))?;

    let nums: Vec<f32> = media_box.iter().filter_map(|obj| as_number(doc, obj)).collect();
    if nums.len() < 4 {
        return Err(Error::Parse(format!(
            "MediaBox has {} numeric elements, expected 4",
            nums.len()
        )));
    }
    Ok((nums[2] - nums[0], nums[3] - nums[1]))
}

/// Walk up the page tree looking for a MediaBox entry.
fn find_media_box(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Option<Vec<lopdf::Object>> {
    if let Ok(obj) = dict.get(b"MediaBox") {
        if let Some(arr) = resolve_array(doc, obj) {
            return Some(arr);
        }
    }
    let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    let parent = doc.get_object(parent_id).ok()?.as_dict().ok()?;
    find_media_box(doc, parent)
}

/// Resolve an object to an array, following one level of indirection.
fn resolve_array(doc: &lopdf::Document, obj: &lopdf::Object) -> Option<Vec<lopdf::Object>> {
    match obj {
        lopdf::Object::Array(arr) => Some(arr.clone()),
        lopdf::Object::Reference(id) => match doc.get_object(*id).ok()? {
            lopdf::Object::Array(arr) => Some(arr.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn as_number(doc: &lopdf::Document, obj: &lopdf::Object) -> Option<f32> {
    let resolved = match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match resolved {
        lopdf::Object::Integer(i) => Some(*i as f32),
        lopdf::Object::Real(f) => Some(*f),
        _ => None,
    }
}

/// Title/author/creator from the trailer's Info dictionary.
pub fn document_info(doc: &lopdf::Document) -> DocumentInfo {
    let mut info = DocumentInfo {
        title: None,
        author: None,
        creator: None,
        page_count: doc.get_pages().len(),
    };

    let info_dict = match doc.trailer.get(b"Info") {
        Ok(lopdf::Object::Reference(id)) => match doc.get_object(*id) {
            Ok(lopdf::Object::Dictionary(d)) => d,
            _ => return info,
        },
        Ok(lopdf::Object::Dictionary(d)) => d,
        _ => return info,
    };

    let read = |key: &[u8]| -> Option<String> {
        match info_dict.get(key) {
            Ok(lopdf::Object::String(bytes, _)) => Some(decode_text_simple(bytes)),
            Ok(lopdf::Object::Name(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    };

    info.title = read(b"Title");
    info.author = read(b"Author");
    info.creator = read(b"Creator");
    info
}

/// Map of font resource key (the `/F1`-style name) to declared encoding
/// name, for fonts on the given page that declare one.
pub fn page_font_encodings(doc: &lopdf::Document, page: ObjectId) -> HashMap<Vec<u8>, String> {
    let mut encodings = HashMap::new();
    let fonts = match doc.get_page_fonts(page) {
        Ok(map) => map,
        Err(_) => return encodings,
    };
    for (key, dict) in fonts {
        if let Ok(lopdf::Object::Name(name)) = dict.get(b"Encoding") {
            encodings.insert(key, String::from_utf8_lossy(name).into_owned());
        }
    }
    encodings
}

/// Decode string bytes shown by a text operator.
///
/// Identity-encoded (CID) fonts use 2-byte codes; try UTF-16BE for those
/// before falling back to the generic heuristic.
pub fn decode_show_text(bytes: &[u8], encoding: Option<&str>) -> String {
    if let Some(enc) = encoding {
        if enc.contains("Identity") && bytes.len() >= 2 && bytes.len() % 2 == 0 {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            let decoded = String::from_utf16_lossy(&units);
            if !decoded.is_empty() && !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }
    }
    decode_text_simple(bytes)
}

/// Best-effort decoding of raw PDF string bytes.
///
/// UTF-16BE with BOM first, then valid UTF-8, then Latin-1 (each byte
/// mapped to its code point).
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- decode_text_simple --

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text_simple(b"Hello, world!"), "Hello, world!");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // 0xE9 is U+00E9 in Latin-1 but invalid standalone UTF-8.
        assert_eq!(decode_text_simple(&[0x63, 0x61, 0x66, 0xE9]), "caf\u{00E9}");
    }

    #[test]
    fn test_decode_utf16be_bom() {
        assert_eq!(
            decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42]),
            "AB"
        );
    }

    #[test]
    fn test_decode_utf16be_odd_trailing_byte_dropped() {
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41, 0x00]), "A");
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode_text_simple(&[]), "");
    }

    // -- decode_show_text --

    #[test]
    fn test_identity_encoding_decodes_utf16() {
        // "中" U+4E2D as a 2-byte CID string.
        let decoded = decode_show_text(&[0x4E, 0x2D], Some("Identity-H"));
        assert_eq!(decoded, "中");
    }

    #[test]
    fn test_identity_garbage_falls_back() {
        // All-null UTF-16 decodes to NULs; fall back to the generic path.
        let decoded = decode_show_text(&[0x00, 0x00], Some("Identity-H"));
        assert_eq!(decoded, "\0\0");
    }

    #[test]
    fn test_no_encoding_uses_simple_path() {
        assert_eq!(decode_show_text(b"plain", None), "plain");
    }

    // -- load_bytes --

    #[test]
    fn test_load_garbage_is_parse_error() {
        assert!(matches!(
            load_bytes(b"not a pdf"),
            Err(crate::Error::Parse(_))
        ));
    }
}
