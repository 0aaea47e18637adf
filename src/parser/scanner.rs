// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Character-level scanning primitives
//!
//! A byte cursor over the source text. Every `read_*` primitive either
//! consumes a complete token and returns it, or leaves the cursor exactly
//! where it was and returns `None`.

use crate::model::Value;

/// Cursor over formula source text
#[derive(Debug, Clone)]
pub struct Scanner<'input> {
    input: &'input str,
    position: usize,
}

impl<'input> Scanner<'input> {
    /// Create a scanner positioned at the start of `input`
    pub fn new(input: &'input str) -> Self {
        Self { input, position: 0 }
    }

    /// Current byte offset
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor back (or forward) to a previously saved position
    #[inline]
    pub fn reset(&mut self, position: usize) {
        debug_assert!(position <= self.input.len());
        self.position = position;
    }

    /// Unconsumed part of the input
    #[inline]
    pub fn rest(&self) -> &'input str {
        &self.input[self.position..]
    }

    /// Check if the whole input has been consumed
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Byte under the cursor
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + offset).copied()
    }

    /// Advance the cursor by `len` bytes
    #[inline]
    pub fn advance(&mut self, len: usize) {
        self.position = (self.position + len).min(self.input.len());
    }

    /// Consume `byte` if it is under the cursor
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Skip spaces and tabs
    pub fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.position += 1;
        }
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.position;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.position += 1;
        }
        self.position - start
    }

    /// Read an integer or float literal with an optional leading `-`
    ///
    /// A `.` is only consumed when at least one digit follows it, so `2.` reads
    /// as the integer `2` and leaves the dot for the caller. Integer literals too
    /// large for `i64` are read as floats.
    pub fn read_number(&mut self) -> Option<Value> {
        let start = self.position;
        self.eat(b'-');
        if self.skip_digits() == 0 {
            self.position = start;
            return None;
        }

        let is_float = self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit());
        if is_float {
            self.position += 1;
            self.skip_digits();
        }

        let text = &self.input[start..self.position];
        let value = if is_float {
            text.parse::<f64>().ok().map(Value::Float)
        } else {
            text.parse::<i64>()
                .map(Value::Int)
                .or_else(|_| text.parse::<f64>().map(Value::Float))
                .ok()
        };
        if value.is_none() {
            self.position = start;
        }
        value
    }

    /// Read a string delimited by `'` or `"`, without escape sequences
    ///
    /// Returns the content between the delimiters, or `None` when the cursor
    /// is not on a quote or the string is unterminated.
    pub fn read_quoted_string(&mut self) -> Option<&'input str> {
        let quote = match self.peek() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return None,
        };
        let content_start = self.position + 1;
        let length = self.input.as_bytes()[content_start..]
            .iter()
            .position(|&b| b == quote)?;
        self.position = content_start + length + 1;
        Some(&self.input[content_start..content_start + length])
    }

    /// Read an identifier: a letter or `_`, then letters, digits and `_`
    pub fn read_identifier(&mut self) -> Option<&'input str> {
        let start = self.position;
        if !self.peek().is_some_and(|b| b.is_ascii_alphabetic() || b == b'_') {
            return None;
        }
        self.position += 1;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.position += 1;
        }
        Some(&self.input[start..self.position])
    }
}
