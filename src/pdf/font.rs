//! Standard-font handling for the receipt
//!
//! The receipt uses Helvetica and Helvetica-Bold, two of the 14 standard PDF
//! fonts, so no font program is embedded. Text measurement uses the AFM
//! glyph widths so centered and right-aligned text lands where intended.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Resource names the content streams refer to
pub const REGULAR: &str = "F1";
pub const BOLD: &str = "F2";

/// Add a standard Type1 font dictionary to the document
fn add_standard_font(doc: &mut Document, base_font: &str) -> ObjectId {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(base_font.as_bytes().to_vec()));
    doc.add_object(Object::Dictionary(font))
}

pub fn helvetica(doc: &mut Document) -> ObjectId {
    add_standard_font(doc, "Helvetica")
}

pub fn helvetica_bold(doc: &mut Document) -> ObjectId {
    add_standard_font(doc, "Helvetica-Bold")
}

/// Escape special characters in PDF literal strings
pub fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

/// Helvetica glyph widths for ASCII 32-126, in 1/1000ths of the em square
/// (Adobe AFM values)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica-Bold glyph widths for ASCII 32-126
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

fn glyph_width(ch: char, bold: bool) -> u16 {
    let table = if bold {
        &HELVETICA_BOLD_WIDTHS
    } else {
        &HELVETICA_WIDTHS
    };
    let code = ch as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        // Out of the ASCII range: assume an average-width glyph
        556
    }
}

/// Width of a string in points when set at `size`
pub fn text_width(text: &str, size: f64, bold: bool) -> f64 {
    let units: u64 = text.chars().map(|ch| glyph_width(ch, bold) as u64).sum();
    units as f64 * size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("a(b)c"), "a\\(b\\)c");
        assert_eq!(escape_pdf_string("back\\slash"), "back\\\\slash");
        assert_eq!(escape_pdf_string("plain"), "plain");
    }

    #[test]
    fn test_text_width_digits() {
        // Digits are 556/1000 em in both weights
        let w = text_width("120", 10.0, false);
        assert!((w - 3.0 * 5.56).abs() < 1e-9);
    }

    #[test]
    fn test_bold_wider_than_regular() {
        let regular = text_width("TOTAL KOLI", 16.0, false);
        let bold = text_width("TOTAL KOLI", 16.0, true);
        assert!(bold > regular);
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let w = text_width("é", 10.0, false);
        assert!((w - 5.56).abs() < 1e-9);
    }
}
