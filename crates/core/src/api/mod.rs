//! High-level API module for removing text from PDF documents.
//!
//! # Example
//!
//! ```ignore
//! use untext_core::api::{EditOptions, remove_text_from_file};
//!
//! let report = remove_text_from_file("in.pdf", "out.pdf", &EditOptions::default())?;
//! println!("{report}");
//! ```

pub mod high_level;

// Re-export for convenience
pub use high_level::{
    EditOptions, EditReport, remove_text, remove_text_from_document, remove_text_from_file,
};
