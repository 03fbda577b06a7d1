//! Deferred pagination and page numbering
//!
//! A page footer must state the page's position out of the final total, but
//! the total is unknown until the body has finished flowing across pages. So
//! rendering is two passes: pass one lays out content into an ordered list of
//! [`PageProof`] value objects; pass two ([`finalize`]) stamps each proof's
//! `{page}/{total}` footer and only then emits the PDF object tree. Nothing
//! in pass two re-enters live drawing state, and any failure aborts the whole
//! document — no partial buffer is ever handed back.

use lopdf::{Dictionary, Document, Object, Stream};

use crate::error::{Error, Result};
use crate::layout::{Length, PageGeometry};
use crate::pdf::font;

/// Footer distance from the right page edge, in points
const FOOTER_RIGHT_INSET: f64 = 40.0;

/// Footer font size in points
const FOOTER_FONT_SIZE: f64 = 9.0;

/// Snapshot of one laid-out page: its 1-based ordinal and the accumulated
/// content-stream operators. Proofs are plain values owned by the render
/// call; they are consumed by [`finalize`] and never outlive it.
#[derive(Debug, Clone)]
pub struct PageProof {
    pub number: usize,
    pub ops: String,
}

/// Pass-one accumulator: collects operators for the current page and closes
/// pages into proofs as the composer breaks them.
#[derive(Debug)]
pub struct ProofSheet {
    pages: Vec<PageProof>,
    current: String,
}

impl ProofSheet {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
        }
    }

    /// 1-based ordinal of the page currently being written
    pub fn page_number(&self) -> usize {
        self.pages.len() + 1
    }

    /// Append a content-stream fragment to the current page
    pub fn op(&mut self, fragment: &str) {
        self.current.push_str(fragment);
        if !fragment.ends_with('\n') {
            self.current.push('\n');
        }
    }

    /// Close the current page and start a fresh one
    pub fn break_page(&mut self) {
        let ops = std::mem::take(&mut self.current);
        self.pages.push(PageProof {
            number: self.pages.len() + 1,
            ops,
        });
    }

    /// Close the in-progress page (if it has content) and return the ordered
    /// proof list
    pub fn finish(mut self) -> Vec<PageProof> {
        if !self.current.is_empty() {
            self.break_page();
        }
        self.pages
    }
}

impl Default for ProofSheet {
    fn default() -> Self {
        Self::new()
    }
}

/// Operators for the `{page}/{total}` footer stamp, right-aligned 40pt from
/// the right page edge, half an inch above the bottom
pub fn footer_ops(page: usize, total: usize, geometry: &PageGeometry) -> String {
    let text = format!("{}/{}", page, total);
    let width = font::text_width(&text, FOOTER_FONT_SIZE, false);
    let x = geometry.page.width.pt() - FOOTER_RIGHT_INSET - width;
    let y = Length::from_inches(0.5).pt();

    format!(
        "BT\n/{} {} Tf\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\nET\n",
        font::REGULAR,
        FOOTER_FONT_SIZE,
        x,
        y,
        font::escape_pdf_string(&text),
    )
}

/// Pass two: stamp footers onto the captured proofs and emit the finished
/// document as a byte buffer.
///
/// When `stamp_footers` is false the proofs already carry inline footers
/// (single-pass estimate strategy) and are emitted as-is. An empty proof list
/// still produces a valid zero-page document.
pub fn finalize(
    proofs: Vec<PageProof>,
    geometry: &PageGeometry,
    stamp_footers: bool,
) -> Result<Vec<u8>> {
    let total = proofs.len();
    let mut doc = Document::with_version("1.5");

    let regular_id = font::helvetica(&mut doc);
    let bold_id = font::helvetica_bold(&mut doc);

    let mut fonts = Dictionary::new();
    fonts.set(font::REGULAR, Object::Reference(regular_id));
    fonts.set(font::BOLD, Object::Reference(bold_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let page_width = geometry.page.width.pt();
    let page_height = geometry.page.height.pt();

    let mut page_ids = Vec::with_capacity(total);
    for proof in proofs {
        let mut ops = proof.ops;
        if stamp_footers {
            ops.push_str(&footer_ops(proof.number, total, geometry));
        }

        let content_id = doc.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set(
            "MediaBox",
            vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_width as f32),
                Object::Real(page_height as f32),
            ],
        );
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Reference(resources_id));
        page_ids.push(doc.add_object(page_dict));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set(
        "Kids",
        Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
    );
    pages_dict.set("Count", Object::Integer(page_ids.len() as i64));
    let pages_id = doc.add_object(pages_dict);

    for page_id in &page_ids {
        let page_obj = doc
            .get_object_mut(*page_id)
            .map_err(|e| Error::Render(e.to_string()))?;
        if let Object::Dictionary(page_dict) = page_obj {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| Error::Render(e.to_string()))?;
    Ok(buffer)
}

/// Single-pass page-count estimate from row counts alone.
///
/// Assumes every row takes one line; long cell text that wraps makes the
/// real count higher, which is the documented accuracy risk of this
/// strategy.
pub fn estimate_page_count(
    data_rows: usize,
    first_page_capacity: usize,
    full_page_capacity: usize,
) -> usize {
    if data_rows <= first_page_capacity {
        return 1;
    }
    let remaining = data_rows - first_page_capacity;
    1 + remaining.div_ceil(full_page_capacity.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::metadata;

    #[test]
    fn test_proof_sheet_orders_pages() {
        let mut sheet = ProofSheet::new();
        assert_eq!(sheet.page_number(), 1);
        sheet.op("0 g");
        sheet.break_page();
        assert_eq!(sheet.page_number(), 2);
        sheet.op("0 g");

        let proofs = sheet.finish();
        assert_eq!(proofs.len(), 2);
        assert_eq!(proofs[0].number, 1);
        assert_eq!(proofs[1].number, 2);
    }

    #[test]
    fn test_finish_without_content_yields_no_pages() {
        let proofs = ProofSheet::new().finish();
        assert!(proofs.is_empty());
    }

    #[test]
    fn test_footer_ops_text() {
        let geometry = PageGeometry::receipt();
        let ops = footer_ops(2, 5, &geometry);
        assert!(ops.contains("(2/5) Tj"));
        assert!(ops.contains("/F1 9 Tf"));
    }

    #[test]
    fn test_finalize_stamps_every_page() {
        let geometry = PageGeometry::receipt();
        let mut sheet = ProofSheet::new();
        for _ in 0..3 {
            sheet.op("0 g");
            sheet.break_page();
        }

        let buffer = finalize(sheet.finish(), &geometry, true).unwrap();
        let text = String::from_utf8_lossy(&buffer);
        assert!(text.contains("(1/3) Tj"));
        assert!(text.contains("(2/3) Tj"));
        assert!(text.contains("(3/3) Tj"));
    }

    #[test]
    fn test_finalize_zero_pages_succeeds() {
        let geometry = PageGeometry::receipt();
        let buffer = finalize(Vec::new(), &geometry, true).unwrap();
        assert!(!buffer.is_empty());

        let doc = lopdf::Document::load_mem(&buffer).unwrap();
        assert_eq!(metadata::count_pages_in(&doc).unwrap(), 0);
    }

    #[test]
    fn test_estimate_page_count() {
        assert_eq!(estimate_page_count(10, 40, 60), 1);
        assert_eq!(estimate_page_count(40, 40, 60), 1);
        assert_eq!(estimate_page_count(41, 40, 60), 2);
        assert_eq!(estimate_page_count(100, 40, 60), 2);
        assert_eq!(estimate_page_count(101, 40, 60), 3);
    }
}
