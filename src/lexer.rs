//! JSON token scanner.
//!
//! Converts raw input bytes into a stream of tokens for the parser. The
//! scanner is byte-oriented: string tokens borrow the contents between the
//! quotes with escape sequences still intact (resolving them is the value
//! builder's job), and number tokens borrow the full validated literal.
//! Input is not required to be UTF-8; any byte at or above 0x20 may appear
//! unescaped inside a string.

use crate::error::{Error, JsonkResult};

/// Token types produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Left brace `{`
    ObjectStart,
    /// Right brace `}`
    ObjectEnd,
    /// Left bracket `[`
    ArrayStart,
    /// Right bracket `]`
    ArrayEnd,
    /// Colon `:`
    Colon,
    /// Comma `,`
    Comma,
    /// String contents between the quotes, escapes unresolved.
    String(&'a [u8]),
    /// Validated numeric literal.
    Number(&'a [u8]),
    /// `true` literal
    True,
    /// `false` literal
    False,
    /// `null` literal
    Null,
    /// End of input
    Eof,
}

/// Cursor over the input byte range.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new scanner over `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Current byte offset into the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.input.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Read the next token, consuming it and any leading whitespace.
    pub fn next_token(&mut self) -> JsonkResult<Token<'a>> {
        self.skip_whitespace();

        match self.peek() {
            None => Ok(Token::Eof),
            Some(b'{') => {
                self.pos += 1;
                Ok(Token::ObjectStart)
            }
            Some(b'}') => {
                self.pos += 1;
                Ok(Token::ObjectEnd)
            }
            Some(b'[') => {
                self.pos += 1;
                Ok(Token::ArrayStart)
            }
            Some(b']') => {
                self.pos += 1;
                Ok(Token::ArrayEnd)
            }
            Some(b':') => {
                self.pos += 1;
                Ok(Token::Colon)
            }
            Some(b',') => {
                self.pos += 1;
                Ok(Token::Comma)
            }
            Some(b'"') => self.read_string(),
            Some(b'-' | b'0'..=b'9') => self.read_number(),
            Some(b't' | b'f' | b'n') => self.read_literal(),
            Some(_) => Err(Error::InvalidSyntax(self.pos)),
        }
    }

    /// Read a string token. The reported bounds are the contents between
    /// the quotes; both quotes are consumed.
    fn read_string(&mut self) -> JsonkResult<Token<'a>> {
        let open = self.pos;
        self.pos += 1;
        let start = self.pos;

        loop {
            match self.advance() {
                None => return Err(Error::UnterminatedString(open)),
                Some(b'"') => {
                    return Ok(Token::String(&self.input[start..self.pos - 1]));
                }
                Some(b'\\') => self.read_escape()?,
                Some(b) if b < 0x20 => {
                    // Raw control bytes must be escaped.
                    return Err(Error::InvalidSyntax(self.pos - 1));
                }
                Some(_) => {}
            }
        }
    }

    /// Validate one escape sequence; the backslash is already consumed.
    fn read_escape(&mut self) -> JsonkResult<()> {
        match self.advance() {
            None => Err(Error::InvalidEscape(self.pos)),
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => Ok(()),
            Some(b'u') => {
                for _ in 0..4 {
                    match self.advance() {
                        Some(h) if h.is_ascii_hexdigit() => {}
                        _ => return Err(Error::InvalidEscape(self.pos)),
                    }
                }
                Ok(())
            }
            Some(_) => Err(Error::InvalidEscape(self.pos - 1)),
        }
    }

    fn read_number(&mut self) -> JsonkResult<Token<'a>> {
        let start = self.pos;
        let len = scan_number(&self.input[start..]).map_err(|e| match e {
            Error::InvalidNumber(rel) => Error::InvalidNumber(start + rel),
            other => other,
        })?;
        self.pos += len;
        Ok(Token::Number(&self.input[start..start + len]))
    }

    fn read_literal(&mut self) -> JsonkResult<Token<'a>> {
        let rest = &self.input[self.pos..];
        if rest.starts_with(b"true") {
            self.pos += 4;
            Ok(Token::True)
        } else if rest.starts_with(b"false") {
            self.pos += 5;
            Ok(Token::False)
        } else if rest.starts_with(b"null") {
            self.pos += 4;
            Ok(Token::Null)
        } else {
            Err(Error::InvalidSyntax(self.pos))
        }
    }
}

/// Validate a numeric literal at the start of `input` and return the
/// number of bytes it spans.
///
/// Grammar: optional `-`; integer part `0` or `1-9` then digits; optional
/// `.` with at least one digit; optional `e`/`E`, optional sign, at least
/// one digit. A lone minus or a leading zero followed by digits fails.
pub(crate) fn scan_number(input: &[u8]) -> JsonkResult<usize> {
    let mut i = 0;

    if input.first() == Some(&b'-') {
        i += 1;
    }

    match input.get(i) {
        Some(b'0') => {
            i += 1;
            if let Some(b'0'..=b'9') = input.get(i) {
                return Err(Error::InvalidNumber(i));
            }
        }
        Some(b'1'..=b'9') => {
            i += 1;
            while let Some(b'0'..=b'9') = input.get(i) {
                i += 1;
            }
        }
        _ => return Err(Error::InvalidNumber(i)),
    }

    if input.get(i) == Some(&b'.') {
        i += 1;
        match input.get(i) {
            Some(b'0'..=b'9') => i += 1,
            _ => return Err(Error::InvalidNumber(i)),
        }
        while let Some(b'0'..=b'9') = input.get(i) {
            i += 1;
        }
    }

    if let Some(b'e' | b'E') = input.get(i) {
        i += 1;
        if let Some(b'+' | b'-') = input.get(i) {
            i += 1;
        }
        match input.get(i) {
            Some(b'0'..=b'9') => i += 1,
            _ => return Err(Error::InvalidNumber(i)),
        }
        while let Some(b'0'..=b'9') = input.get(i) {
            i += 1;
        }
    }

    Ok(i)
}
