//! Document store - drawing surfaces, resource tables and the PDF backend.
//!
//! This module contains:
//! - `surface` - surface identity (SurfaceId) and XObject resource tables
//! - `store` - the SurfaceStore trait the walker edits through
//! - `pdf` - PdfDocument, the lopdf-backed store with load/save

pub mod pdf;
pub mod store;
pub mod surface;

// Re-export main types for convenience
pub use pdf::PdfDocument;
pub use store::SurfaceStore;
pub use surface::{ResourceEntry, ResourceKind, ResourceTable, SurfaceId};
