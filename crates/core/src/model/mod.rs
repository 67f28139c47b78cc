//! Data model types - content stream tokens and object identity.
//!
//! - `token` - content stream tokens (Token, Operand, InlineImage)
//! - `objects` - indirect object references (ObjRef)

pub mod objects;
pub mod token;

// Re-export main types for convenience
pub use objects::ObjRef;
pub use token::{InlineImage, Operand, StringFormat, Token};
