use unicode_normalization::UnicodeNormalization;

/// Normalize one decoded line of page text.
///
/// NFC normalization, ligature expansion, and removal of the Unicode
/// replacement character left behind by undecodable glyphs. Fragment
/// merging and whitespace policy live downstream; this only repairs the
/// decoding artifacts.
pub fn clean_line(text: &str) -> String {
    let mut result: String = text.nfc().collect();

    for (lig, replacement) in [
        ("\u{FB00}", "ff"),
        ("\u{FB01}", "fi"),
        ("\u{FB02}", "fl"),
        ("\u{FB03}", "ffi"),
        ("\u{FB04}", "ffl"),
    ] {
        if result.contains(lig) {
            result = result.replace(lig, replacement);
        }
    }

    if result.contains('\u{FFFD}') {
        result = result.replace('\u{FFFD}', "");
    }

    result.trim().to_string()
}
