//! Receipt PDF rendering module

pub mod compose;
pub mod font;
pub mod metadata;
pub mod paginate;

// Re-export commonly used items
pub use compose::{render_receipt, RenderOptions};
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
pub use paginate::{finalize, PageProof, ProofSheet};
