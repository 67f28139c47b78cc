//! Content stream writer.
//!
//! Serializes [`Token`]s back to content stream syntax. The output is
//! canonical rather than byte-faithful: operands are separated by a single
//! space and every operator ends its line. Reading the output back yields
//! the same token sequence.

use std::io::Write;

use crate::error::{PdfError, Result};
use crate::model::{InlineImage, Operand, StringFormat, Token};
use crate::parser::lexer::is_delimiter;

/// Writes tokens into a byte buffer.
#[derive(Debug, Default)]
pub struct ContentWriter {
    buf: Vec<u8>,
}

impl ContentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Write every token in order.
    pub fn write_all(&mut self, tokens: &[Token]) -> Result<()> {
        for token in tokens {
            self.write_token(token)?;
        }
        if tokens.last().is_some_and(Token::is_operand) && self.buf.last() == Some(&b' ') {
            self.buf.pop();
            self.buf.push(b'\n');
        }
        Ok(())
    }

    pub fn write_token(&mut self, token: &Token) -> Result<()> {
        match token {
            Token::Operator(name) => {
                self.buf.extend_from_slice(name.as_bytes());
                self.buf.push(b'\n');
            }
            Token::Operand(Operand::InlineImage(image)) => self.write_inline_image(image)?,
            Token::Operand(operand) => {
                self.write_operand(operand)?;
                self.buf.push(b' ');
            }
        }
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn write_operand(&mut self, operand: &Operand) -> Result<()> {
        match operand {
            Operand::Null => self.buf.extend_from_slice(b"null"),
            Operand::Bool(b) => self.buf.extend_from_slice(if *b { b"true" } else { b"false" }),
            Operand::Int(n) => write!(self.buf, "{n}")?,
            Operand::Real(n) => self.write_real(*n)?,
            Operand::Name(name) => self.write_name(name),
            Operand::String { bytes, format } => match format {
                StringFormat::Literal => self.write_literal(bytes),
                StringFormat::Hex => self.write_hex(bytes),
            },
            Operand::Array(items) => {
                self.buf.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.buf.push(b' ');
                    }
                    self.write_operand(item)?;
                }
                self.buf.push(b']');
            }
            Operand::Dict(dict) => {
                self.buf.extend_from_slice(b"<<");
                for (i, (key, value)) in dict.iter().enumerate() {
                    if i > 0 {
                        self.buf.push(b' ');
                    }
                    self.write_name(key);
                    self.buf.push(b' ');
                    self.write_operand(value)?;
                }
                self.buf.extend_from_slice(b">>");
            }
            Operand::InlineImage(_) => {
                return Err(PdfError::TypeError {
                    expected: "direct operand",
                    got: operand.type_name(),
                });
            }
        }
        Ok(())
    }

    fn write_real(&mut self, n: f64) -> Result<()> {
        if !n.is_finite() {
            return Err(PdfError::Decode(format!("cannot write real {n}")));
        }
        let start = self.buf.len();
        write!(self.buf, "{n}")?;
        if !self.buf[start..].contains(&b'.') {
            self.buf.extend_from_slice(b".0");
        }
        Ok(())
    }

    fn write_name(&mut self, name: &str) {
        self.buf.push(b'/');
        for ch in name.chars() {
            let code = ch as u32;
            if code > 0xFF {
                let mut utf8 = [0u8; 4];
                for &b in ch.encode_utf8(&mut utf8).as_bytes() {
                    self.push_name_escape(b);
                }
                continue;
            }
            let b = code as u8;
            if (0x21..=0x7E).contains(&b) && b != b'#' && !is_delimiter(b) {
                self.buf.push(b);
            } else {
                self.push_name_escape(b);
            }
        }
    }

    fn push_name_escape(&mut self, b: u8) {
        self.buf.push(b'#');
        self.buf.push(HEX[(b >> 4) as usize]);
        self.buf.push(HEX[(b & 0x0F) as usize]);
    }

    fn write_literal(&mut self, bytes: &[u8]) {
        self.buf.push(b'(');
        for &b in bytes {
            match b {
                b'(' | b')' | b'\\' => {
                    self.buf.push(b'\\');
                    self.buf.push(b);
                }
                // A bare CR would be read back as LF.
                b'\r' => self.buf.extend_from_slice(b"\\r"),
                _ => self.buf.push(b),
            }
        }
        self.buf.push(b')');
    }

    fn write_hex(&mut self, bytes: &[u8]) {
        self.buf.push(b'<');
        for &b in bytes {
            self.buf.push(HEX[(b >> 4) as usize]);
            self.buf.push(HEX[(b & 0x0F) as usize]);
        }
        self.buf.push(b'>');
    }

    /// `BI`, one parameter per line, `ID`, the raw data, then a separator
    /// before the `EI` operator that follows.
    fn write_inline_image(&mut self, image: &InlineImage) -> Result<()> {
        self.buf.extend_from_slice(b"BI\n");
        for (key, value) in &image.params {
            self.write_name(key);
            self.buf.push(b' ');
            self.write_operand(value)?;
            self.buf.push(b'\n');
        }
        self.buf.extend_from_slice(b"ID\n");
        self.buf.extend_from_slice(&image.data);
        // A reader strips one whitespace before EI, or CR LF as a pair.
        if image.data.last() == Some(&b'\r') {
            self.buf.push(b' ');
        } else {
            self.buf.push(b'\n');
        }
        Ok(())
    }
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";
