//! # Cursor
//!
//! Provides byte-by-byte navigation through DAP source text with position
//! tracking.
//!
//! DAP source is restricted to ASCII keyword/operator text (character-array
//! literal bodies are copied through as opaque lexeme text), so the cursor
//! operates on a byte slice (`&[u8]`) rather than `Vec<char>`. This avoids
//! the per-source allocation that `.chars().collect()` would require. `pos`
//! serves as both the byte offset and the character index — they coincide
//! for ASCII input.

use crate::error::Span;

/// A cursor for iterating through source code bytes.
///
/// Tracks position in multiple ways:
/// - Byte position (the read cursor itself)
/// - Line and column numbers (for error messages and indentation checks)
///
/// Tabs advance the column to the next multiple of 8, per the indentation
/// rule shared by the lexer and compiler.
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

const TAB_STOP: usize = 8;

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { bytes: source.as_bytes(), pos: 0, line: 1, col: 1 }
    }

    pub fn peek(&self) -> Option<char> {
        self.bytes.get(self.pos).map(|&b| b as char)
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.bytes.get(self.pos + offset).map(|&b| b as char)
    }

    /// Advance to the next byte and return it as a `char`.
    ///
    /// Updates line/column tracking:
    /// - `\n` increments line, resets column to 1
    /// - `\t` advances column to the next multiple of 8
    /// - other chars increment column by one
    pub fn advance(&mut self) -> Option<char> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        match b {
            b'\n' => {
                self.line += 1;
                self.col = 1;
            }
            b'\t' => {
                self.col = ((self.col - 1) / TAB_STOP + 1) * TAB_STOP + 1;
            }
            _ => self.col += 1,
        }
        Some(b as char)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// `(line, col)` of the current cursor position.
    pub fn current_pos(&self) -> (usize, usize) {
        (self.line, self.col)
    }

    pub fn make_span(&self, start_line: usize, start_col: usize) -> Span {
        Span { line: start_line, col: start_col }
    }
}
