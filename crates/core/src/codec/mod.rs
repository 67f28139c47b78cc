//! Content stream codec.
//!
//! - `flate`: zlib compression for stored streams
//! - `writer`: token serialization
//!
//! [`lex`] and [`serialize`] are the two directions used by the editor:
//! bytes to tokens, and tokens back to the bytes that get stored.

pub mod flate;
pub mod writer;

pub use writer::ContentWriter;

use crate::error::Result;
use crate::model::Token;
use crate::parser::ContentParser;

/// How rewritten content is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Plain bytes, no `/Filter`.
    None,
    /// `/Filter /FlateDecode`.
    #[default]
    Flate,
}

/// Serialized content ready to be stored, with the filter it was encoded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedContent {
    pub data: Vec<u8>,
    pub compression: Compression,
}

/// Tokenize decoded content stream bytes.
pub fn lex(data: &[u8]) -> Result<Vec<Token>> {
    ContentParser::new(data).parse()
}

/// Serialize tokens and encode them for storage.
pub fn serialize(tokens: &[Token], compression: Compression) -> Result<EncodedContent> {
    let mut writer = ContentWriter::with_capacity(tokens.len() * 8);
    writer.write_all(tokens)?;
    let plain = writer.into_bytes();
    let data = match compression {
        Compression::None => plain,
        Compression::Flate => flate::compress(&plain)?,
    };
    Ok(EncodedContent { data, compression })
}
