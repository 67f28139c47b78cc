//! Error types for untext.

use std::path::PathBuf;

use smol_str::SmolStr;
use thiserror::Error;

use crate::document::SurfaceId;
use crate::model::ObjRef;

/// Primary error type for content stream editing.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to load {}: {msg}", path.display())]
    Load { path: PathBuf, msg: String },

    #[error("encrypted documents are not supported")]
    Encrypted,

    #[error("invalid token at position {pos}: {msg}")]
    Lex { pos: usize, msg: String },

    #[error("unexpected end of content stream at position {pos}")]
    UnexpectedEof { pos: usize },

    #[error("operator {operator} needs {arity} operand(s) but only {available} precede it")]
    StructuralRemoval {
        operator: SmolStr,
        arity: usize,
        available: usize,
    },

    #[error("{surface}: {source}")]
    Surface {
        surface: SurfaceId,
        #[source]
        source: Box<PdfError>,
    },

    #[error("failed to save {}: {msg}", path.display())]
    Save { path: PathBuf, msg: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("key not found: {0}")]
    KeyError(String),

    #[error("PDF object not found: {0}")]
    ObjectNotFound(ObjRef),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfError {
    /// Attach the identity of the surface being edited.
    ///
    /// Errors that already carry a surface are returned unchanged so the
    /// innermost (offending) surface is the one reported.
    pub fn in_surface(self, surface: &SurfaceId) -> Self {
        match self {
            Self::Surface { .. } => self,
            other => Self::Surface {
                surface: *surface,
                source: Box::new(other),
            },
        }
    }

    /// The error with any surface context stripped.
    pub fn root(&self) -> &PdfError {
        match self {
            Self::Surface { source, .. } => source.root(),
            other => other,
        }
    }

    /// The surface an error was raised for, if any.
    pub fn surface(&self) -> Option<&SurfaceId> {
        match self {
            Self::Surface { surface, .. } => Some(surface),
            _ => None,
        }
    }

    /// True for errors raised while lexing a content stream.
    pub fn is_lex_error(&self) -> bool {
        matches!(
            self.root(),
            Self::Lex { .. } | Self::UnexpectedEof { .. }
        )
    }
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
