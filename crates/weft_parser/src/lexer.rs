//! Lexer for block bodies.
//!
//! Line breaks separate statements, except inside `(..)` and `[..]` where they
//! are ignored. `#` starts a comment that runs to the end of the line.

use crate::error::ParseError;
use crate::token::{Token, TokenKind};
use weft_source::{FileId, Span};

/// Splits `source` into tokens, ending with [`TokenKind::Eof`].
pub fn lex(source: &str, file: FileId) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        depth: 0,
        file,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    depth: u32,
    file: FileId,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: self.span_from(self.pos),
                });
                return Ok(tokens);
            }
            tokens.push(self.next_token()?);
        }
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\n' if self.depth > 0 => self.pos += 1,
                b'\\' if self.peek_at(1) == b'\n' => self.pos += 2,
                b'#' => {
                    while self.pos < self.source.len() && self.peek() != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        let c = self.peek();
        let kind = match c {
            b'\n' => {
                self.pos += 1;
                TokenKind::Newline
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                while matches!(self.peek(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
                    self.pos += 1;
                }
                let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
                TokenKind::keyword(text).unwrap_or(TokenKind::Ident)
            }
            b'0'..=b'9' => {
                self.lex_number(start)?;
                TokenKind::Int
            }
            b'"' | b'\'' => {
                self.lex_string(start, c)?;
                TokenKind::Str
            }
            _ => self.lex_punct(start)?,
        };
        Ok(Token {
            kind,
            span: self.span_from(start),
        })
    }

    fn lex_number(&mut self, start: usize) -> Result<(), ParseError> {
        let radix_digits: fn(u8) -> bool = match (self.peek(), self.peek_at(1)) {
            (b'0', b'x' | b'X') => {
                self.pos += 2;
                |c| c.is_ascii_hexdigit()
            }
            (b'0', b'b' | b'B') => {
                self.pos += 2;
                |c| c == b'0' || c == b'1'
            }
            _ => |c| c.is_ascii_digit(),
        };
        let digits_start = self.pos;
        while radix_digits(self.peek()) || self.peek() == b'_' {
            self.pos += 1;
        }
        if self.pos == digits_start || self.peek().is_ascii_alphanumeric() {
            while self.peek().is_ascii_alphanumeric() {
                self.pos += 1;
            }
            return Err(ParseError::new(
                "malformed integer literal",
                self.span_from(start),
            ));
        }
        Ok(())
    }

    fn lex_string(&mut self, start: usize, quote: u8) -> Result<(), ParseError> {
        self.pos += 1;
        loop {
            match self.peek() {
                0 | b'\n' => {
                    return Err(ParseError::new(
                        "unterminated string literal",
                        self.span_from(start),
                    ))
                }
                b'\\' => self.pos = (self.pos + 2).min(self.source.len()),
                c if c == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
    }

    fn lex_punct(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        let (kind, len) = match (self.peek(), self.peek_at(1), self.peek_at(2)) {
            (b'<', b'<', b'=') => (TokenKind::ShlAssign, 3),
            (b'<', b'<', _) => (TokenKind::Shl, 2),
            (b'>', b'>', _) => (TokenKind::Shr, 2),
            (b'<', b'=', _) => (TokenKind::Le, 2),
            (b'>', b'=', _) => (TokenKind::Ge, 2),
            (b'=', b'=', _) => (TokenKind::EqEq, 2),
            (b'!', b'=', _) => (TokenKind::NotEq, 2),
            (b'@', b'=', _) => (TokenKind::AtAssign, 2),
            (b'+' | b'-' | b'|' | b'&' | b'^', b'=', _) => (TokenKind::OpAssign, 2),
            (b'<', ..) => (TokenKind::Lt, 1),
            (b'>', ..) => (TokenKind::Gt, 1),
            (b'=', ..) => (TokenKind::Assign, 1),
            (b'+', ..) => (TokenKind::Plus, 1),
            (b'-', ..) => (TokenKind::Minus, 1),
            (b'*', ..) => (TokenKind::Star, 1),
            (b'/', ..) => (TokenKind::Slash, 1),
            (b'%', ..) => (TokenKind::Percent, 1),
            (b'&', ..) => (TokenKind::Amp, 1),
            (b'|', ..) => (TokenKind::Pipe, 1),
            (b'^', ..) => (TokenKind::Caret, 1),
            (b'~', ..) => (TokenKind::Tilde, 1),
            (b'.', ..) => (TokenKind::Dot, 1),
            (b',', ..) => (TokenKind::Comma, 1),
            (b':', ..) => (TokenKind::Colon, 1),
            (b';', ..) => (TokenKind::Semi, 1),
            (b'{', ..) => (TokenKind::LBrace, 1),
            (b'}', ..) => (TokenKind::RBrace, 1),
            (b'(' | b'[', ..) => {
                self.depth += 1;
                let kind = if self.peek() == b'(' {
                    TokenKind::LParen
                } else {
                    TokenKind::LBracket
                };
                (kind, 1)
            }
            (b')' | b']', ..) => {
                self.depth = self.depth.saturating_sub(1);
                let kind = if self.peek() == b')' {
                    TokenKind::RParen
                } else {
                    TokenKind::RBracket
                };
                (kind, 1)
            }
            _ => {
                let ch = std::str::from_utf8(&self.source[start..])
                    .ok()
                    .and_then(|s| s.chars().next())
                    .unwrap_or('?');
                self.pos += ch.len_utf8().max(1);
                return Err(ParseError::new(
                    format!("unexpected character `{ch}`"),
                    self.span_from(start),
                ));
            }
        };
        self.pos += len;
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src, FileId::from_raw(0))
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn assignment_tokens() {
        assert_eq!(
            kinds("s.b = s.a"),
            vec![
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn sequential_assign_is_one_token() {
        assert_eq!(
            kinds("s.r <<= 0x1F"),
            vec![
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::ShlAssign,
                TokenKind::Int,
                TokenKind::Eof
            ]
        );
        assert_eq!(kinds("a <= b")[1], TokenKind::Le);
        assert_eq!(kinds("a @= b")[1], TokenKind::AtAssign);
        assert_eq!(kinds("a += b")[1], TokenKind::OpAssign);
    }

    #[test]
    fn newlines_inside_brackets_are_ignored() {
        let k = kinds("f(a,\n b)\nx");
        assert_eq!(k.iter().filter(|k| **k == TokenKind::Newline).count(), 1);
    }

    #[test]
    fn comments_and_keywords() {
        assert_eq!(
            kinds("if x # trailing\n"),
            vec![TokenKind::If, TokenKind::Ident, TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn strings_and_numbers() {
        assert_eq!(
            kinds("'it\\'s' 0b1010 1_000"),
            vec![TokenKind::Str, TokenKind::Int, TokenKind::Int, TokenKind::Eof]
        );
    }

    #[test]
    fn errors_carry_spans() {
        let err = lex("s.a = $", FileId::from_raw(0)).unwrap_err();
        assert_eq!((err.span.start, err.span.end), (6, 7));
        assert!(lex("\"open", FileId::from_raw(0)).is_err());
        assert!(lex("0x", FileId::from_raw(0)).is_err());
        assert!(lex("12ab", FileId::from_raw(0)).is_err());
    }
}
