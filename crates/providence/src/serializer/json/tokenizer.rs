// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON tokenizer with line/column tracking.

use std::fmt;

use crate::error::{CodecError, Result};
use crate::serializer::descend;

/// Longest snippet of source text quoted in an error.
const SNIPPET_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Colon,
    Comma,
    String(String),
    /// Raw number text, validated against the JSON number grammar.
    Number(String),
    True,
    False,
    Null,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeginObject => f.write_str("'{'"),
            Self::EndObject => f.write_str("'}'"),
            Self::BeginArray => f.write_str("'['"),
            Self::EndArray => f.write_str("']'"),
            Self::Colon => f.write_str("':'"),
            Self::Comma => f.write_str("','"),
            Self::String(s) => write!(f, "string \"{s}\""),
            Self::Number(n) => write!(f, "number {n}"),
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

pub(crate) struct Tokenizer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    peeked: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            peeked: None,
        }
    }

    /// Next token; end of input is an error.
    pub(crate) fn next(&mut self) -> Result<Token> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.skip_whitespace();
        if self.pos >= self.bytes.len() {
            return Err(self.failure_at(self.line, self.column, "unexpected end of input"));
        }
        self.read_token()
    }

    pub(crate) fn peek(&mut self) -> Result<&Token> {
        if self.peeked.is_none() {
            let token = self.next()?;
            self.peeked = Some(token);
        }
        match &self.peeked {
            Some(token) => Ok(token),
            None => Err(self.failure_at(self.line, self.column, "unexpected end of input")),
        }
    }

    /// Consume the next token, which must be `kind`.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        let token = self.next()?;
        if &token.kind != kind {
            return Err(self.failure(&token, &format!("expected {kind}, found {}", token.kind)));
        }
        Ok(token)
    }

    /// Consume the next token if it is `kind`.
    pub(crate) fn consume_if(&mut self, kind: &TokenKind) -> Result<bool> {
        if &self.peek()?.kind == kind {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Only whitespace may follow.
    pub(crate) fn expect_end(&mut self) -> Result<()> {
        if let Some(token) = self.peeked.take() {
            return Err(self.failure(&token, "trailing content after message"));
        }
        self.skip_whitespace();
        if self.pos < self.bytes.len() {
            return Err(self.failure_at(self.line, self.column, "trailing content after message"));
        }
        Ok(())
    }

    /// Consume one complete value (for unknown fields) found at `depth`.
    pub(crate) fn skip_value(&mut self, depth: usize) -> Result<()> {
        let token = self.next()?;
        match token.kind {
            TokenKind::BeginObject => {
                let depth = descend(depth)?;
                if self.consume_if(&TokenKind::EndObject)? {
                    return Ok(());
                }
                loop {
                    let key = self.next()?;
                    if !matches!(key.kind, TokenKind::String(_)) {
                        return Err(self.failure(&key, "expected object key"));
                    }
                    self.expect(&TokenKind::Colon)?;
                    self.skip_value(depth)?;
                    if !self.list_continues(&TokenKind::EndObject)? {
                        return Ok(());
                    }
                }
            }
            TokenKind::BeginArray => {
                let depth = descend(depth)?;
                if self.consume_if(&TokenKind::EndArray)? {
                    return Ok(());
                }
                loop {
                    self.skip_value(depth)?;
                    if !self.list_continues(&TokenKind::EndArray)? {
                        return Ok(());
                    }
                }
            }
            TokenKind::String(_)
            | TokenKind::Number(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => Ok(()),
            other => Err(self.failure(&token_at(other, token.line, token.column), "expected a value")),
        }
    }

    /// After an element: `true` on ',', `false` on `close`, error otherwise.
    pub(crate) fn list_continues(&mut self, close: &TokenKind) -> Result<bool> {
        let token = self.next()?;
        if token.kind == TokenKind::Comma {
            Ok(true)
        } else if &token.kind == close {
            Ok(false)
        } else {
            Err(self.failure(&token, &format!("expected ',' or {close}, found {}", token.kind)))
        }
    }

    pub(crate) fn failure(&self, token: &Token, message: &str) -> CodecError {
        self.failure_at(token.line, token.column, message)
    }

    fn failure_at(&self, line: usize, column: usize, message: &str) -> CodecError {
        let source_line = self.text.lines().nth(line.saturating_sub(1)).unwrap_or_default();
        let start = column.saturating_sub(SNIPPET_LEN / 2 + 1);
        let snippet: String = source_line.chars().skip(start).take(SNIPPET_LEN).collect();
        CodecError::MalformedJson {
            line,
            column,
            snippet: snippet.trim().to_string(),
            message: message.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            match b {
                b' ' | b'\t' | b'\r' => self.advance(),
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.column = 1;
                }
                _ => break,
            }
        }
    }

    /// Step over one byte; continuation bytes of a UTF-8 sequence do not
    /// count as columns.
    fn advance(&mut self) {
        if let Some(&b) = self.bytes.get(self.pos) {
            if b & 0xC0 != 0x80 {
                self.column += 1;
            }
            self.pos += 1;
        }
    }

    fn read_token(&mut self) -> Result<Token> {
        let (line, column) = (self.line, self.column);
        let b = self.bytes[self.pos];
        let kind = match b {
            b'{' => self.symbol(TokenKind::BeginObject),
            b'}' => self.symbol(TokenKind::EndObject),
            b'[' => self.symbol(TokenKind::BeginArray),
            b']' => self.symbol(TokenKind::EndArray),
            b':' => self.symbol(TokenKind::Colon),
            b',' => self.symbol(TokenKind::Comma),
            b'"' => TokenKind::String(self.read_string()?),
            b'-' | b'0'..=b'9' => TokenKind::Number(self.read_number()?),
            b'a'..=b'z' | b'A'..=b'Z' => self.read_literal()?,
            _ => {
                let found = self.text[self.pos..].chars().next().unwrap_or_default();
                return Err(self.failure_at(line, column, &format!("unexpected character '{found}'")));
            }
        };
        Ok(token_at(kind, line, column))
    }

    fn symbol(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn read_literal(&mut self) -> Result<TokenKind> {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_alphanumeric) {
            self.advance();
        }
        match &self.text[start..self.pos] {
            "true" => Ok(TokenKind::True),
            "false" => Ok(TokenKind::False),
            "null" => Ok(TokenKind::Null),
            other => Err(self.failure_at(line, column, &format!("unexpected literal '{other}'"))),
        }
    }

    fn read_number(&mut self) -> Result<String> {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        if self.bytes[self.pos] == b'-' {
            self.advance();
        }
        let int_digits = self.digits();
        let mut valid = int_digits > 0;
        if self.bytes.get(self.pos) == Some(&b'.') {
            self.advance();
            valid &= self.digits() > 0;
        }
        if matches!(self.bytes.get(self.pos), Some(b'e' | b'E')) {
            self.advance();
            if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
                self.advance();
            }
            valid &= self.digits() > 0;
        }
        let text = &self.text[start..self.pos];
        if !valid {
            return Err(self.failure_at(line, column, &format!("invalid number '{text}'")));
        }
        Ok(text.to_string())
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.advance();
        }
        self.pos - start
    }

    fn read_string(&mut self) -> Result<String> {
        let (line, column) = (self.line, self.column);
        self.advance(); // opening quote
        let mut out = String::new();
        loop {
            let Some(&b) = self.bytes.get(self.pos) else {
                return Err(self.failure_at(line, column, "unterminated string"));
            };
            match b {
                b'"' => {
                    self.advance();
                    return Ok(out);
                }
                b'\\' => {
                    self.advance();
                    self.read_escape(&mut out)?;
                }
                0x00..=0x1F => {
                    return Err(self.failure_at(
                        self.line,
                        self.column,
                        "control character in string",
                    ));
                }
                _ => {
                    // Copy one whole UTF-8 character.
                    let ch = self.text[self.pos..].chars().next().unwrap_or_default();
                    out.push(ch);
                    for _ in 0..ch.len_utf8() {
                        self.advance();
                    }
                }
            }
        }
    }

    fn read_escape(&mut self, out: &mut String) -> Result<()> {
        let (line, column) = (self.line, self.column);
        let Some(&b) = self.bytes.get(self.pos) else {
            return Err(self.failure_at(line, column, "unterminated escape"));
        };
        self.advance();
        match b {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let high = self.read_hex4()?;
                let ch = if (0xD800..0xDC00).contains(&high) {
                    if self.bytes.get(self.pos..self.pos + 2) != Some(&b"\\u"[..]) {
                        return Err(self.failure_at(line, column, "unpaired surrogate"));
                    }
                    self.advance();
                    self.advance();
                    let low = self.read_hex4()?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(self.failure_at(line, column, "unpaired surrogate"));
                    }
                    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
                } else {
                    char::from_u32(high)
                };
                match ch {
                    Some(ch) => out.push(ch),
                    None => return Err(self.failure_at(line, column, "invalid unicode escape")),
                }
            }
            other => {
                return Err(self.failure_at(
                    line,
                    column,
                    &format!("invalid escape '\\{}'", char::from(other)),
                ))
            }
        }
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let (line, column) = (self.line, self.column);
        let hex = self
            .text
            .get(self.pos..self.pos + 4)
            .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.failure_at(line, column, "invalid unicode escape"))?;
        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| self.failure_at(line, column, "invalid unicode escape"))?;
        for _ in 0..4 {
            self.advance();
        }
        Ok(value)
    }
}

fn token_at(kind: TokenKind, line: usize, column: usize) -> Token {
    Token { kind, line, column }
}
