//! Low-level character cursor for type-encoding decoding.
//!
//! This module provides the [`Cursor`] type, a position-tracking reader over the bytes of a
//! type encoding. Encodings are ASCII-compatible; every delimiter the decoder cares about is a
//! single ASCII byte, so slicing at cursor positions always lands on `char` boundaries.
//!
//! # Key Components
//!
//! - [`Cursor::peek_byte`] / [`Cursor::read_byte`] - Single byte access
//! - [`Cursor::read_decimal`] - Unsigned decimal literals (array counts, bitfield widths)
//! - [`Cursor::read_signed_decimal`] - Optional offset annotations
//! - [`Cursor::take_until`] - Tag names and quoted class names
//!
//! # Examples
//!
//! ```rust
//! use objscope::encoding::Cursor;
//!
//! let mut cursor = Cursor::new("12i");
//! assert_eq!(cursor.read_decimal("count")?, 12);
//! assert_eq!(cursor.peek_byte(), Some(b'i'));
//! # Ok::<(), objscope::Error>(())
//! ```

use crate::Result;

/// A cursor over the bytes of a type encoding.
///
/// All reading methods validate data availability and report failures as
/// [`crate::Error::MalformedEncoding`] carrying the current offset.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// The encoding being decoded
    source: &'a str,
    /// Current position within the encoding
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new [`Cursor`] positioned at the start of `source`
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Cursor {
            source,
            position: 0,
        }
    }

    /// Returns the length of the underlying encoding in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Returns `true` if the encoding is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Returns `true` if there is more data available to decode
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.source.len()
    }

    /// Get the current position of the cursor
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// The part of the encoding that has not been consumed yet
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        self.source.get(self.position..).unwrap_or_default()
    }

    /// Peek at the next byte without advancing, `None` at the end of input
    #[must_use]
    pub fn peek_byte(&self) -> Option<u8> {
        self.source.as_bytes().get(self.position).copied()
    }

    /// Move the position past the next character
    ///
    /// The position always stays on a `char` boundary, a non-ASCII character is skipped
    /// as a whole.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedEncoding`] at the end of input.
    pub fn advance(&mut self) -> Result<()> {
        match self.remaining().chars().next() {
            Some(current) => {
                self.position += current.len_utf8();
                Ok(())
            }
            None => Err(malformed_error!(self.position, "Unexpected end of encoding")),
        }
    }

    /// Read the first byte of the next character and advance past the whole character
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedEncoding`] at the end of input.
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self
            .peek_byte()
            .ok_or_else(|| malformed_error!(self.position, "Unexpected end of encoding"))?;
        self.advance()?;
        Ok(byte)
    }

    /// Consume the ASCII byte `expected` if it is next, returning whether it was consumed
    pub fn eat(&mut self, expected: u8) -> bool {
        if expected.is_ascii() && self.peek_byte() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Read an unsigned decimal literal. Leading zeros are accepted.
    ///
    /// ## Arguments
    /// * `what` - Name of the literal, used in error messages
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedEncoding`] if no digit is present or the value
    /// does not fit into a `u64`.
    pub fn read_decimal(&mut self, what: &str) -> Result<u64> {
        let start = self.position;
        let mut value: u64 = 0;

        while let Some(byte) = self.peek_byte().filter(u8::is_ascii_digit) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(byte - b'0')))
                .ok_or_else(|| malformed_error!(start, "Decimal {} is too large", what))?;
            self.position += 1;
        }

        if self.position == start {
            return Err(match self.peek_byte() {
                Some(byte) => malformed_error!(
                    start,
                    "Expected decimal {}, found '{}'",
                    what,
                    char::from(byte).escape_default()
                ),
                None => malformed_error!(start, "Expected decimal {}, found end of encoding", what),
            });
        }

        Ok(value)
    }

    /// Read an optional, optionally signed, decimal literal.
    ///
    /// Returns `Ok(None)` without consuming anything if the next byte is neither a digit nor
    /// a sign.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedEncoding`] for a sign without digits or a value that
    /// does not fit into an `i64`.
    pub fn read_signed_decimal(&mut self, what: &str) -> Result<Option<i64>> {
        let start = self.position;
        let negative = match self.peek_byte() {
            Some(b'-') => {
                self.position += 1;
                true
            }
            Some(b'+') => {
                self.position += 1;
                false
            }
            Some(byte) if byte.is_ascii_digit() => false,
            _ => return Ok(None),
        };

        let magnitude = self.read_decimal(what)?;
        let value = i64::try_from(magnitude)
            .map_err(|_| malformed_error!(start, "Decimal {} is too large", what))?;

        Ok(Some(if negative { -value } else { value }))
    }

    /// Consume bytes up to (not including) the first byte matching `stop` and return them.
    ///
    /// Returns `None` and leaves the position untouched if the end of input is reached
    /// before a stop byte, or if the stop byte lies inside a multi-byte character.
    pub fn take_until(&mut self, stop: impl Fn(u8) -> bool) -> Option<&'a str> {
        let rest = self.remaining().as_bytes();
        let end = self.position + rest.iter().position(|byte| stop(*byte))?;
        let taken = self.source.get(self.position..end)?;
        self.position = end;
        Some(taken)
    }
}
