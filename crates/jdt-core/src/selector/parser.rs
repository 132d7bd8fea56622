//! Recursive-descent parser for the selector grammar
//!
//! Grammar (a deliberately small JSONPath subset):
//!
//! ```text
//! selector  := '$'? step*  |  name step*        (leading name = relative path)
//! step      := '.' name  |  '[' indices ']'  |  '[?(' filter ')]'
//! indices   := int (',' int)*                   (negative counts from the end)
//! filter    := '@.' ident ('==' literal)?
//! literal   := string | int | 'true' | 'false' | 'null'
//! ```

use super::{Filter, SelectorError, SelectorSegment, MAX_SEGMENTS};
use serde_json::Value;

pub(super) struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(super) fn parse(mut self) -> Result<Vec<SelectorSegment>, SelectorError> {
        if self.input.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut segments = Vec::new();
        match self.peek() {
            Some(b'$') => {
                self.pos += 1;
            }
            Some(b'@') => return Err(SelectorError::Unsupported("leading '@'")),
            // Relative paths like "B" or "C1.C11" resolve against the
            // current node, matching the original transform fixtures.
            _ => segments.push(SelectorSegment::Child(self.name()?)),
        }

        while self.pos < self.input.len() {
            match self.peek() {
                Some(b'.') => {
                    self.pos += 1;
                    segments.push(SelectorSegment::Child(self.name()?));
                }
                Some(b'[') => {
                    self.pos += 1;
                    segments.push(self.bracket()?);
                }
                _ => return self.fail("expected '.' or '['"),
            }
            if segments.len() > MAX_SEGMENTS {
                return Err(SelectorError::TooDeep);
            }
        }

        Ok(segments)
    }

    /// Everything inside `[` ... `]`: a filter, one index, or an index union.
    fn bracket(&mut self) -> Result<SelectorSegment, SelectorError> {
        if self.peek() == Some(b'?') {
            self.pos += 1;
            self.expect(b'(')?;
            let filter = self.filter()?;
            self.expect(b')')?;
            self.expect(b']')?;
            return Ok(SelectorSegment::Filter(filter));
        }

        let mut indices = Vec::new();
        loop {
            self.skip_ws();
            indices.push(self.int()?);
            self.skip_ws();
            if self.peek() == Some(b',') {
                self.pos += 1;
                continue;
            }
            break;
        }
        self.expect(b']')?;
        Ok(SelectorSegment::Indices(indices))
    }

    fn filter(&mut self) -> Result<Filter, SelectorError> {
        self.skip_ws();
        if !self.rest().starts_with("@.") {
            return Err(SelectorError::Unsupported("filter must start with '@.'"));
        }
        self.pos += 2;
        let field = self.ident()?;
        self.skip_ws();
        if self.rest().starts_with("==") {
            self.pos += 2;
            self.skip_ws();
            let literal = self.literal()?;
            return Ok(Filter::Equals(field, literal));
        }
        Ok(Filter::Exists(field))
    }

    /// A child name: everything up to the next structural byte.
    fn name(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'.' | b'[' | b']') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return self.fail("expected a name");
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !(b.is_ascii_alphanumeric() || b == b'_') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return self.fail("expected an identifier");
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn literal(&mut self) -> Result<Value, SelectorError> {
        for (text, value) in [
            ("true", Value::Bool(true)),
            ("false", Value::Bool(false)),
            ("null", Value::Null),
        ] {
            if self.rest().starts_with(text) {
                self.pos += text.len();
                return Ok(value);
            }
        }
        if self.peek() == Some(b'"') {
            return self.string_literal();
        }
        Ok(Value::Number(self.int()?.into()))
    }

    /// A double-quoted JSON string literal, delegated to the codec so escape
    /// handling matches document parsing exactly.
    fn string_literal(&mut self) -> Result<Value, SelectorError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    let raw = &self.input[start..self.pos];
                    return serde_json::from_str(raw)
                        .map_err(|_| self.err_at(start, "invalid string literal"));
                }
                _ => self.pos += 1,
            }
        }
        Err(self.err_at(start, "unterminated string literal"))
    }

    fn int(&mut self) -> Result<i64, SelectorError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        let digits = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == digits {
            return self.fail("expected an integer");
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| self.err_at(start, "integer out of range"))
    }

    fn expect(&mut self, byte: u8) -> Result<(), SelectorError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            match byte {
                b'(' => self.fail("expected '('"),
                b')' => self.fail("expected ')'"),
                _ => self.fail("expected ']'"),
            }
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn fail<T>(&self, message: &'static str) -> Result<T, SelectorError> {
        Err(self.err_at(self.pos, message))
    }

    fn err_at(&self, at: usize, message: &'static str) -> SelectorError {
        SelectorError::Invalid { at, message }
    }
}
