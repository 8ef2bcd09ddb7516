//! OCR text normalization.
//!
//! Receipts mix Arabic and Latin script, and OCR engines substitute look-alike
//! glyphs for separators. Normalization maps those onto the small ASCII set
//! the extraction patterns expect. It is a pure character substitution: no
//! character is added or removed, and anything outside the table passes
//! through unchanged.

/// Normalize raw OCR text.
///
/// Idempotent: every replacement lies outside the substitution table, so
/// `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    raw.chars().map(normalize_char).collect()
}

/// Normalize a single character.
pub fn normalize_char(c: char) -> char {
    match c {
        // Slash look-alikes
        '|' | '\\' => '/',

        // Hyphen, non-breaking hyphen, figure dash, en dash, em dash,
        // horizontal bar, minus sign
        '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',

        // Arabic-Indic digits
        '\u{0660}'..='\u{0669}' => ascii_digit(c as u32 - 0x0660),

        // Extended Arabic-Indic (Persian/Urdu) digits
        '\u{06F0}'..='\u{06F9}' => ascii_digit(c as u32 - 0x06F0),

        // Arabic decimal separator
        '\u{066B}' => '.',

        // Arabic thousands separator, Arabic comma
        '\u{066C}' | '\u{060C}' => ',',

        _ => c,
    }
}

fn ascii_digit(value: u32) -> char {
    char::from_digit(value, 10).unwrap_or('0')
}
