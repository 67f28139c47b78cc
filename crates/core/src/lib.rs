//! untext - strip text-showing operators from PDF content streams.
//!
//! Pages and every Form XObject they reach are rewritten without their
//! `Tj`, `TJ`, `'` and `"` operators; all other drawing is kept.

pub mod api;
pub mod codec;
pub mod document;
pub mod error;
pub mod filter;
pub mod model;
pub mod parser;
pub mod walker;

// Re-export high_level for convenience
pub use api::high_level;

pub use error::{PdfError, Result};
