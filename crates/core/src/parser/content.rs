//! Content stream parser.
//!
//! Turns lexical tokens into [`Token`]s: arrays and dictionaries are folded
//! into single operands, and a `BI ... ID ... EI` inline image becomes an
//! [`Operand::InlineImage`] followed by the `EI` operator.
//!
//! Unlike a rendering parser this one is strict: anything that cannot be
//! written back faithfully (unbalanced brackets, operators inside arrays,
//! truncated strings) is an error.

use std::collections::VecDeque;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::lexer::{ContentLexer, LexToken};
use crate::error::{PdfError, Result};
use crate::model::{InlineImage, Operand, StringFormat, Token};

/// Context frame for tracking array/dict construction
#[derive(Debug)]
enum Context {
    Array(usize, Vec<Operand>),
    Dict(usize, Vec<Operand>),
}

/// Parser for PDF content streams.
pub struct ContentParser<'a> {
    lexer: ContentLexer<'a>,
    /// Tokens ready to be returned (the `EI` after an inline image)
    pending: VecDeque<Token>,
    /// Context stack for nested arrays/dicts
    context_stack: Vec<Context>,
    /// Operands collected between `BI` and `ID`, with the `BI` position
    inline_params: Option<(usize, Vec<Operand>)>,
    done: bool,
}

impl<'a> ContentParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: ContentLexer::new(data),
            pending: VecDeque::new(),
            context_stack: Vec::new(),
            inline_params: None,
            done: false,
        }
    }

    /// Parse the whole stream.
    pub fn parse(self) -> Result<Vec<Token>> {
        let tokens = self.collect::<Result<Vec<_>>>()?;
        if tokens.last().is_some_and(Token::is_operand) {
            let dangling = tokens.iter().rev().take_while(|t| t.is_operand()).count();
            tracing::warn!(dangling, "content stream ends with operands but no operator");
        }
        Ok(tokens)
    }

    fn fail(&mut self, err: PdfError) -> Option<Result<Token>> {
        self.done = true;
        Some(Err(err))
    }

    /// Place a finished operand: into the innermost array/dict, into the
    /// pending inline image parameters, or out to the caller.
    fn emit(&mut self, operand: Operand) -> Option<Token> {
        if let Some(ctx) = self.context_stack.last_mut() {
            match ctx {
                Context::Array(_, items) | Context::Dict(_, items) => items.push(operand),
            }
            None
        } else if let Some((_, params)) = self.inline_params.as_mut() {
            params.push(operand);
            None
        } else {
            Some(Token::Operand(operand))
        }
    }

    fn handle_keyword(&mut self, pos: usize, name: SmolStr) -> Result<Option<Token>> {
        if !self.context_stack.is_empty() {
            return Err(PdfError::Lex {
                pos,
                msg: format!("operator {name} inside array or dictionary"),
            });
        }

        if let Some((bi_pos, params)) = self.inline_params.take() {
            if name.as_str() != "ID" {
                return Err(PdfError::Lex {
                    pos,
                    msg: format!("operator {name} inside inline image started at {bi_pos}"),
                });
            }
            let params = build_dict(params, bi_pos)?;
            let data = self.lexer.read_inline_data()?;
            self.pending.push_back(Token::operator("EI"));
            return Ok(Some(Token::Operand(Operand::InlineImage(Box::new(
                InlineImage { params, data },
            )))));
        }

        match name.as_str() {
            "BI" => {
                self.inline_params = Some((pos, Vec::new()));
                Ok(None)
            }
            "ID" | "EI" => Err(PdfError::Lex {
                pos,
                msg: format!("{name} outside of an inline image"),
            }),
            _ => Ok(Some(Token::Operator(name))),
        }
    }
}

impl Iterator for ContentParser<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(tok) = self.pending.pop_front() {
            return Some(Ok(tok));
        }
        if self.done {
            return None;
        }

        loop {
            let (pos, token) = match self.lexer.next_token() {
                Some(Ok(t)) => t,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.done = true;
                    let open = match (self.context_stack.last(), &self.inline_params) {
                        (Some(Context::Array(pos, _)), _) | (Some(Context::Dict(pos, _)), _) => {
                            Some(*pos)
                        }
                        (None, Some((pos, _))) => Some(*pos),
                        (None, None) => None,
                    };
                    return open.map(|pos| Err(PdfError::UnexpectedEof { pos }));
                }
            };

            let operand = match token {
                LexToken::ArrayStart => {
                    self.context_stack.push(Context::Array(pos, Vec::new()));
                    continue;
                }
                LexToken::ArrayEnd => match self.context_stack.pop() {
                    Some(Context::Array(_, items)) => Operand::Array(items),
                    _ => {
                        return self.fail(PdfError::Lex {
                            pos,
                            msg: "unbalanced ']'".into(),
                        });
                    }
                },
                LexToken::DictStart => {
                    self.context_stack.push(Context::Dict(pos, Vec::new()));
                    continue;
                }
                LexToken::DictEnd => match self.context_stack.pop() {
                    Some(Context::Dict(dict_pos, items)) => match build_dict(items, dict_pos) {
                        Ok(dict) => Operand::Dict(dict),
                        Err(e) => return self.fail(e),
                    },
                    _ => {
                        return self.fail(PdfError::Lex {
                            pos,
                            msg: "unbalanced '>>'".into(),
                        });
                    }
                },
                LexToken::BraceOpen | LexToken::BraceClose => {
                    return self.fail(PdfError::Lex {
                        pos,
                        msg: "procedure braces are not allowed in content streams".into(),
                    });
                }
                LexToken::Keyword(name) => match self.handle_keyword(pos, name) {
                    Ok(Some(tok)) => return Some(Ok(tok)),
                    Ok(None) => continue,
                    Err(e) => return self.fail(e),
                },
                LexToken::Int(n) => Operand::Int(n),
                LexToken::Real(n) => Operand::Real(n),
                LexToken::Bool(b) => Operand::Bool(b),
                LexToken::Null => Operand::Null,
                LexToken::Literal(name) => Operand::Name(name),
                LexToken::String(bytes) => Operand::String {
                    bytes,
                    format: StringFormat::Literal,
                },
                LexToken::HexString(bytes) => Operand::String {
                    bytes,
                    format: StringFormat::Hex,
                },
            };

            if let Some(tok) = self.emit(operand) {
                return Some(Ok(tok));
            }
        }
    }
}

/// Build dictionary from key-value pairs. Duplicate keys keep the last value.
fn build_dict(items: Vec<Operand>, pos: usize) -> Result<IndexMap<String, Operand>> {
    if items.len() % 2 != 0 {
        return Err(PdfError::Lex {
            pos,
            msg: "dictionary has a key without a value".into(),
        });
    }
    let mut dict = IndexMap::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        let Operand::Name(key) = key else {
            return Err(PdfError::Lex {
                pos,
                msg: format!("dictionary key must be a name, got {}", key.type_name()),
            });
        };
        if let Some(previous) = dict.insert(key, value) {
            tracing::warn!(
                pos,
                replaced = previous.type_name(),
                "duplicate dictionary key, keeping the last value"
            );
        }
    }
    Ok(dict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_array_in_dict() {
        let tokens = ContentParser::new(b"/Span << /MCID [1 [2]] >> BDC")
            .parse()
            .unwrap();
        let mut dict = IndexMap::new();
        dict.insert(
            "MCID".to_string(),
            Operand::Array(vec![Operand::Int(1), Operand::Array(vec![Operand::Int(2)])]),
        );
        assert_eq!(
            tokens,
            vec![
                Token::Operand(Operand::name("Span")),
                Token::Operand(Operand::Dict(dict)),
                Token::operator("BDC"),
            ]
        );
    }

    #[test]
    fn test_odd_dict_is_error() {
        let err = ContentParser::new(b"<< /A >> gs").parse().unwrap_err();
        assert!(matches!(err, PdfError::Lex { pos: 0, .. }));
    }

    #[test]
    fn test_duplicate_dict_key_keeps_last_value() {
        let tokens = ContentParser::new(b"/P << /A 1 /B 2 /A 3 >> BDC")
            .parse()
            .unwrap();
        let Token::Operand(Operand::Dict(dict)) = &tokens[1] else {
            panic!("expected dictionary");
        };
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("A"), Some(&Operand::Int(3)));
        // The key keeps its first position.
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_operator_inside_array_is_error() {
        let err = ContentParser::new(b"[ (a) Tj ] TJ").parse().unwrap_err();
        assert!(matches!(err, PdfError::Lex { pos: 6, .. }));
    }

    #[test]
    fn test_unclosed_array_is_eof() {
        let err = ContentParser::new(b"q [ 1 2").parse().unwrap_err();
        assert!(matches!(err, PdfError::UnexpectedEof { pos: 2 }));
    }

    #[test]
    fn test_stray_ei_is_error() {
        assert!(ContentParser::new(b"q EI Q").parse().is_err());
    }

    #[test]
    fn test_iteration_stops_after_error() {
        let mut parser = ContentParser::new(b"] q");
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
    }
}
