//! Content stream tokenizer.
//!
//! Splits raw (decoded) content stream bytes into lexical tokens. Structure
//! (arrays, dictionaries, inline images) is assembled one level up by
//! [`ContentParser`](super::content::ContentParser).

use smol_str::SmolStr;

use crate::error::{PdfError, Result};

/// Lexical token types
#[derive(Debug, Clone, PartialEq)]
pub enum LexToken {
    /// Integer value
    Int(i64),
    /// Floating point value
    Real(f64),
    /// Boolean value
    Bool(bool),
    /// `null`
    Null,
    /// Literal name (e.g., /Name), without the slash
    Literal(String),
    /// Literal string `(...)`
    String(Vec<u8>),
    /// Hex string `<...>`
    HexString(Vec<u8>),
    ArrayStart, // [
    ArrayEnd,   // ]
    DictStart,  // <<
    DictEnd,    // >>
    BraceOpen,  // {
    BraceClose, // }
    /// Bare word: an operator such as `BT`, `Tj`, `'`
    Keyword(SmolStr),
}

/// Lexer specialized for PDF content streams.
pub struct ContentLexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ContentLexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        let data = self.data;
        while self.pos < data.len() {
            let b = data[self.pos];
            if b == b'%' {
                self.pos += 1;
                if let Some(offset) = find_line_end(&data[self.pos..]) {
                    self.pos += offset + 1;
                } else {
                    self.pos = data.len();
                }
                continue;
            }
            if !is_whitespace(b) {
                return;
            }
            self.pos += 1;
        }
    }

    fn parse_literal(&mut self) -> LexToken {
        let data = self.data;
        let len = data.len();
        let mut pos = self.pos + 1; // skip '/'
        let mut name = Vec::with_capacity(16);

        while pos < len {
            let b = data[pos];
            if is_whitespace(b) || is_delimiter(b) {
                break;
            }
            if b == b'#' {
                if pos + 2 < len
                    && let (Some(h1), Some(h2)) = (hex_value(data[pos + 1]), hex_value(data[pos + 2]))
                {
                    name.push((h1 << 4) | h2);
                    pos += 3;
                    continue;
                }
                // Invalid escape: keep the '#' literally
                name.push(b);
                pos += 1;
                continue;
            }
            name.push(b);
            pos += 1;
        }

        self.pos = pos;
        LexToken::Literal(name_from_bytes(&name))
    }

    fn parse_number(&mut self) -> Result<LexToken> {
        let data = self.data;
        let len = data.len();
        let start = self.pos;
        let mut pos = start;

        if pos < len && matches!(data[pos], b'+' | b'-') {
            pos += 1;
        }
        let mut has_dot = false;
        let mut digits = 0usize;
        while pos < len {
            let c = data[pos];
            if c.is_ascii_digit() {
                digits += 1;
            } else if c == b'.' && !has_dot {
                has_dot = true;
            } else {
                break;
            }
            pos += 1;
        }

        if digits == 0 {
            return Err(PdfError::Lex {
                pos: start,
                msg: "invalid number".into(),
            });
        }

        // The lexeme is ASCII by construction.
        let text = std::str::from_utf8(&data[start..pos]).map_err(|_| PdfError::Lex {
            pos: start,
            msg: "invalid number".into(),
        })?;
        self.pos = pos;

        if !has_dot && let Ok(value) = text.parse::<i64>() {
            return Ok(LexToken::Int(value));
        }
        // Integers out of i64 range degrade to reals.
        text.parse::<f64>()
            .map(LexToken::Real)
            .map_err(|_| PdfError::Lex {
                pos: start,
                msg: format!("invalid real: {}", text),
            })
    }

    fn parse_string(&mut self) -> Result<LexToken> {
        let data = self.data;
        let len = data.len();
        let start = self.pos;
        let mut pos = self.pos + 1; // skip '('
        let mut depth = 1;
        let mut result = Vec::with_capacity(32);

        while pos < len && depth > 0 {
            let c = data[pos];
            pos += 1;
            match c {
                b'(' => {
                    depth += 1;
                    result.push(b'(');
                }
                b')' => {
                    depth -= 1;
                    if depth > 0 {
                        result.push(b')');
                    }
                }
                b'\\' => {
                    if pos >= len {
                        return Err(PdfError::UnexpectedEof { pos: start });
                    }
                    let esc = data[pos];
                    pos += 1;
                    match esc {
                        b'n' => result.push(b'\n'),
                        b'r' => result.push(b'\r'),
                        b't' => result.push(b'\t'),
                        b'b' => result.push(0x08),
                        b'f' => result.push(0x0c),
                        b'(' => result.push(b'('),
                        b')' => result.push(b')'),
                        b'\\' => result.push(b'\\'),
                        b'\r' => {
                            if pos < len && data[pos] == b'\n' {
                                pos += 1;
                            }
                        }
                        b'\n' => {}
                        c if (b'0'..=b'7').contains(&c) => {
                            let mut octal = (c - b'0') as u32;
                            for _ in 0..2 {
                                match data.get(pos) {
                                    Some(&d) if (b'0'..=b'7').contains(&d) => {
                                        octal = octal * 8 + (d - b'0') as u32;
                                        pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            result.push((octal & 0xFF) as u8);
                        }
                        c => result.push(c),
                    }
                }
                c => result.push(c),
            }
        }

        if depth > 0 {
            return Err(PdfError::UnexpectedEof { pos: start });
        }
        self.pos = pos;
        Ok(LexToken::String(result))
    }

    fn parse_hex_string(&mut self) -> Result<LexToken> {
        let data = self.data;
        let start = self.pos;
        let mut pos = self.pos + 1; // skip '<'
        let mut result = Vec::with_capacity(32);
        let mut pending: Option<u8> = None;

        loop {
            let Some(&c) = data.get(pos) else {
                return Err(PdfError::UnexpectedEof { pos: start });
            };
            pos += 1;
            if c == b'>' {
                break;
            }
            if is_whitespace(c) {
                continue;
            }
            let Some(nibble) = hex_value(c) else {
                return Err(PdfError::Lex {
                    pos: pos - 1,
                    msg: format!("invalid character {:?} in hex string", char::from(c)),
                });
            };
            if let Some(high) = pending.take() {
                result.push((high << 4) | nibble);
            } else {
                pending = Some(nibble);
            }
        }

        // Odd digit count: the final digit is padded with a zero.
        if let Some(high) = pending {
            result.push(high << 4);
        }

        self.pos = pos;
        Ok(LexToken::HexString(result))
    }

    fn parse_keyword(&mut self) -> LexToken {
        let data = self.data;
        let start = self.pos;
        let mut pos = start;
        while pos < data.len() && !is_keyword_end(data[pos]) {
            pos += 1;
        }
        self.pos = pos;

        match &data[start..pos] {
            b"true" => LexToken::Bool(true),
            b"false" => LexToken::Bool(false),
            b"null" => LexToken::Null,
            bytes => LexToken::Keyword(SmolStr::new(name_from_bytes(bytes))),
        }
    }

    /// Get next token
    pub fn next_token(&mut self) -> Option<Result<(usize, LexToken)>> {
        self.skip_whitespace();
        let data = self.data;
        if self.pos >= data.len() {
            return None;
        }

        let token_pos = self.pos;
        let b = data[self.pos];
        let next = data.get(self.pos + 1).copied();

        let result = match b {
            b'/' => Ok(self.parse_literal()),
            b'(' => self.parse_string(),
            b'<' if next == Some(b'<') => {
                self.pos += 2;
                Ok(LexToken::DictStart)
            }
            b'<' => self.parse_hex_string(),
            b'>' if next == Some(b'>') => {
                self.pos += 2;
                Ok(LexToken::DictEnd)
            }
            b'>' | b')' => Err(PdfError::Lex {
                pos: token_pos,
                msg: format!("unbalanced {:?}", char::from(b)),
            }),
            b'[' => {
                self.pos += 1;
                Ok(LexToken::ArrayStart)
            }
            b']' => {
                self.pos += 1;
                Ok(LexToken::ArrayEnd)
            }
            b'{' => {
                self.pos += 1;
                Ok(LexToken::BraceOpen)
            }
            b'}' => {
                self.pos += 1;
                Ok(LexToken::BraceClose)
            }
            b'+' | b'-' if matches!(next, Some(c) if c.is_ascii_digit() || c == b'.') => {
                self.parse_number()
            }
            b'.' if matches!(next, Some(c) if c.is_ascii_digit()) => self.parse_number(),
            c if c.is_ascii_digit() => self.parse_number(),
            _ => Ok(self.parse_keyword()),
        };

        Some(result.map(|token| (token_pos, token)))
    }

    /// Read inline image data following an `ID` operator.
    ///
    /// The data runs up to the first `EI` that is preceded by whitespace
    /// and followed by whitespace, a delimiter or the end of the stream.
    /// The single whitespace byte after `ID` and the line break before
    /// `EI` are not part of the data.
    pub fn read_inline_data(&mut self) -> Result<Vec<u8>> {
        let data = self.data;
        let id_end = self.pos;
        let mut start = self.pos;
        if matches!(data.get(start), Some(&b) if is_whitespace(b)) {
            start += 1;
        }

        let mut p = start;
        while p + 1 < data.len() {
            if &data[p..p + 2] == b"EI"
                && (p == start || is_whitespace(data[p - 1]))
                && data.get(p + 2).is_none_or(|&b| is_keyword_end(b))
            {
                let mut end = p;
                if end > start && is_whitespace(data[end - 1]) {
                    end -= 1;
                    if end > start && data[end] == b'\n' && data[end - 1] == b'\r' {
                        end -= 1;
                    }
                }
                self.pos = p + 2;
                return Ok(data[start..end].to_vec());
            }
            p += 1;
        }

        Err(PdfError::UnexpectedEof { pos: id_end })
    }
}

impl Iterator for ContentLexer<'_> {
    type Item = Result<(usize, LexToken)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Check if byte is PDF whitespace.
pub(crate) const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
}

/// Check if byte is a PDF delimiter.
pub(crate) const fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

const fn is_keyword_end(b: u8) -> bool {
    is_whitespace(b) || is_delimiter(b)
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn find_line_end(data: &[u8]) -> Option<usize> {
    data.iter().position(|&b| b == b'\r' || b == b'\n')
}

pub(crate) fn name_from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(data: &[u8]) -> Vec<LexToken> {
        ContentLexer::new(data)
            .map(|r| r.map(|(_, t)| t))
            .collect::<Result<Vec<_>>>()
            .expect("tokenize")
    }

    #[test]
    fn test_keywords_and_primitives() {
        assert_eq!(
            lex(b"q true false null Q"),
            vec![
                LexToken::Keyword("q".into()),
                LexToken::Bool(true),
                LexToken::Bool(false),
                LexToken::Null,
                LexToken::Keyword("Q".into()),
            ]
        );
    }

    #[test]
    fn test_quote_operators_are_keywords() {
        assert_eq!(
            lex(b"(a) ' 1 2 (b) \""),
            vec![
                LexToken::String(b"a".to_vec()),
                LexToken::Keyword("'".into()),
                LexToken::Int(1),
                LexToken::Int(2),
                LexToken::String(b"b".to_vec()),
                LexToken::Keyword("\"".into()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            lex(b"0 +1 -2 .5 -.25 1.234 3."),
            vec![
                LexToken::Int(0),
                LexToken::Int(1),
                LexToken::Int(-2),
                LexToken::Real(0.5),
                LexToken::Real(-0.25),
                LexToken::Real(1.234),
                LexToken::Real(3.0),
            ]
        );
    }

    #[test]
    fn test_huge_integer_becomes_real() {
        assert_eq!(
            lex(b"99999999999999999999"),
            vec![LexToken::Real(1e20)]
        );
    }

    #[test]
    fn test_invalid_name_escape_is_kept() {
        assert_eq!(lex(b"/a#zz"), vec![LexToken::Literal("a#zz".into())]);
    }

    #[test]
    fn test_unterminated_string_is_eof() {
        let mut lexer = ContentLexer::new(b"(abc");
        let err = lexer.next_token().unwrap().unwrap_err();
        assert!(matches!(err, PdfError::UnexpectedEof { pos: 0 }));
    }

    #[test]
    fn test_stray_close_paren_is_error() {
        let mut lexer = ContentLexer::new(b"  )");
        let err = lexer.next_token().unwrap().unwrap_err();
        assert!(matches!(err, PdfError::Lex { pos: 2, .. }));
    }

    #[test]
    fn test_inline_data_stops_at_delimited_ei() {
        let data = b" ab EIx EI\nQ";
        let mut lexer = ContentLexer::new(data);
        assert_eq!(lexer.read_inline_data().unwrap(), b"ab EIx".to_vec());
        assert_eq!(
            lexer.next_token().unwrap().unwrap().1,
            LexToken::Keyword("Q".into())
        );
    }
}
