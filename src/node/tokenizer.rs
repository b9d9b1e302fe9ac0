//! Splits infix text into [Token]s.

use alloc::string::String;

use crate::error::MathError;

#[derive(PartialEq, Debug, Clone)]
pub enum TokenKind {
    /// Plain digits. The magnitude is kept unsigned so that the parser can fold a leading minus
    /// sign in and still reach `i64::MIN`.
    Integer(u64),

    /// Digits with a decimal point and no exponent.
    Real(f64),

    /// A numeral with an `e` or `E` exponent.
    RealWithExponent { mantissa: f64, exponent: i64 },

    Name(String),
    Plus,
    Minus,
    Times,
    Divide,
    Power,
    Comma,
    LeftParenthesis,
    RightParenthesis,
    End,
}

impl TokenKind {
    pub fn is_numeral(&self) -> bool {
        matches!(self, TokenKind::Integer(_) | TokenKind::Real(_) | TokenKind::RealWithExponent { .. })
    }
}

/// A token, along with the byte range of the input it was read from.
#[derive(PartialEq, Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Reads tokens from a string, one at a time. Cloning a tokenizer gives an independent cursor,
/// which the parser uses for lookahead.
#[derive(Clone, Debug)]
pub struct Tokenizer<'a> {
    src: &'a str,
    i: usize,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, i: 0, finished: false }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.i).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.src.as_bytes().get(self.i + ahead).copied()
    }

    /// The full character at the cursor, for error reporting. Unlike `peek`, this decodes
    /// multi-byte characters.
    fn peek_char(&self) -> Option<char> {
        self.src[self.i..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.i += 1;
            } else {
                break;
            }
        }
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.i += 1;
        }
    }

    /// Reads the next token. Once [TokenKind::End] has been returned, every further call returns
    /// it again.
    pub fn next_token(&mut self) -> Result<Token, MathError> {
        self.skip_whitespace();
        let start = self.i;

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token { kind: TokenKind::End, start, end: start }),
        };

        let kind = match c {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Times,
            b'/' => TokenKind::Divide,
            b'^' => TokenKind::Power,
            b',' => TokenKind::Comma,
            b'(' => TokenKind::LeftParenthesis,
            b')' => TokenKind::RightParenthesis,

            b'0'..=b'9' => return self.numeral(start),
            b'.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => return self.numeral(start),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                while let Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') = self.peek() {
                    self.i += 1;
                }
                return Ok(Token {
                    kind: TokenKind::Name(self.src[start..self.i].into()),
                    start,
                    end: self.i,
                });
            }

            _ => return Err(MathError::Lexical {
                character: self.peek_char().unwrap_or(c as char),
                offset: start,
            }),
        };

        // Every remaining case is a single byte
        self.i += 1;
        Ok(Token { kind, start, end: self.i })
    }

    fn numeral(&mut self, start: usize) -> Result<Token, MathError> {
        self.skip_digits();

        let mut has_point = false;
        if let Some(b'.') = self.peek() {
            has_point = true;
            self.i += 1;
            self.skip_digits();
        }
        let mantissa_end = self.i;

        if let Some(b'e' | b'E') = self.peek() {
            self.i += 1;
            let exponent_start = self.i;
            if let Some(b'+' | b'-') = self.peek() {
                self.i += 1;
            }

            let digits_start = self.i;
            self.skip_digits();
            if digits_start == self.i {
                return Err(match self.peek_char() {
                    Some(character) => MathError::Lexical { character, offset: self.i },
                    None => MathError::syntax(self.i, "digits in exponent"),
                });
            }

            let mantissa = self.src[start..mantissa_end]
                .parse::<f64>()
                .map_err(|_| MathError::syntax(start, "a numeral"))?;
            let exponent = self.src[exponent_start..self.i]
                .parse::<i64>()
                .map_err(|_| MathError::syntax(exponent_start, "an exponent that fits in 64 bits"))?;

            return Ok(Token {
                kind: TokenKind::RealWithExponent { mantissa, exponent },
                start,
                end: self.i,
            });
        }

        let text = &self.src[start..self.i];
        let kind = if has_point {
            TokenKind::Real(text.parse().map_err(|_| MathError::syntax(start, "a numeral"))?)
        } else {
            TokenKind::Integer(
                text.parse()
                    .map_err(|_| MathError::syntax(start, "an integer that fits in 64 bits"))?
            )
        };

        Ok(Token { kind, start, end: self.i })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token, MathError>;

    /// Yields every token up to and including [TokenKind::End], or up to and including the first
    /// error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_token();
        match &result {
            Ok(Token { kind: TokenKind::End, .. }) | Err(_) => self.finished = true,
            Ok(_) => (),
        }
        Some(result)
    }
}
