//! PDF metadata extraction for generated receipts

use std::path::Path;

use lopdf::{Document, Object};

use crate::error::{Error, Result};

/// Basic facts about a PDF file
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a lopdf::Dictionary> {
    let obj = match obj {
        Object::Reference(id) => doc.get_object(*id)?,
        other => other,
    };
    obj.as_dict()
        .map_err(|_| Error::General("expected a dictionary".to_string()))
}

/// Count pages by reading the Count field from the Pages dictionary.
/// More reliable than walking kid arrays when the tree is nested.
pub fn count_pages_in(doc: &Document) -> Result<usize> {
    let root = doc
        .trailer
        .get(b"Root")
        .map_err(|_| Error::General("no Root in trailer".to_string()))?;
    let catalog = resolve_dict(doc, root)?;

    let pages = catalog
        .get(b"Pages")
        .map_err(|_| Error::General("no Pages in catalog".to_string()))?;
    let pages_dict = resolve_dict(doc, pages)?;

    match pages_dict.get(b"Count") {
        Ok(Object::Integer(n)) => Ok(*n as usize),
        _ => Err(Error::General("no Count in Pages".to_string())),
    }
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileRead(format!("{} not found", path.display())));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_in(&doc)?;

    let title = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| resolve_dict(&doc, info).ok())
        .and_then(|info| info.get(b"Title").ok())
        .and_then(|t| t.as_str().ok())
        .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok());

    Ok(PdfMetadata { page_count, title })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileRead(format!("{} not found", path.display())));
    }

    let doc = Document::load(path)?;
    count_pages_in(&doc)
}
