//! Content stream parsing modules.
//!
//! - `lexer`: byte-level tokenizer
//! - `content`: assembles arrays, dictionaries and inline images into tokens

pub mod content;
pub mod lexer;

// Re-export main types for convenience
pub use content::ContentParser;
pub use lexer::{ContentLexer, LexToken};
