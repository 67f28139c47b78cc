//! Content stream token model.
//!
//! A content stream is a flat sequence of [`Token`]s: operands that are
//! pushed in order, and operators that consume the operands preceding them.
//! Compound values (arrays, dictionaries, inline images) are a single
//! operand each.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// How a string operand was written in the source stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringFormat {
    /// `(text)`
    #[default]
    Literal,
    /// `<48656C6C6F>`
    Hex,
}

/// Inline image data from a `BI ... ID ... EI` sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// Image parameters between `BI` and `ID`, in source order.
    pub params: IndexMap<String, Operand>,
    /// Raw (possibly encoded) sample data between `ID` and `EI`.
    pub data: Vec<u8>,
}

/// A literal value pushed onto the operand stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    /// Name without the leading slash. Bytes map 1:1 to chars (Latin-1).
    Name(String),
    String {
        bytes: Vec<u8>,
        format: StringFormat,
    },
    Array(Vec<Operand>),
    Dict(IndexMap<String, Operand>),
    InlineImage(Box<InlineImage>),
}

impl Operand {
    /// Literal string operand.
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Self::String {
            bytes: bytes.into(),
            format: StringFormat::Literal,
        }
    }

    /// Hex string operand.
    pub fn hex_string(bytes: impl Into<Vec<u8>>) -> Self {
        Self::String {
            bytes: bytes.into(),
            format: StringFormat::Hex,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Type name used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Name(_) => "name",
            Self::String { .. } => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::InlineImage(_) => "inline image",
        }
    }
}

/// A single content stream token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Operand(Operand),
    /// Operator name, e.g. `Tj`, `re`, `'`.
    Operator(SmolStr),
}

impl Token {
    pub fn operator(name: &str) -> Self {
        Self::Operator(SmolStr::new(name))
    }

    pub const fn is_operand(&self) -> bool {
        matches!(self, Self::Operand(_))
    }
}

impl From<Operand> for Token {
    fn from(operand: Operand) -> Self {
        Self::Operand(operand)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator(name) => f.write_str(name),
            Self::Operand(operand) => write!(f, "<{}>", operand.type_name()),
        }
    }
}
