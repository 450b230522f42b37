//! Line buffer: the text being edited.
//!
//! A `LineBuffer` is an ordered list of lines, each an independently growable
//! `String`. It is never empty: a fresh buffer holds one zero-length line, and
//! [`replace`](LineBuffer::replace) re-establishes that on load.
//!
//! # Coordinates
//!
//! The public API speaks 1-indexed [`Position`]s. Columns count chars, and
//! every column is converted to a byte offset at the last moment, so
//! non-ASCII Latin-1 characters (which the input decoder produces for bytes
//! 128–186) are never split.
//!
//! # Design choices
//!
//! - **`Vec<String>`**, not a rope. Lines are short, edits happen at one
//!   point at a time, and the renderer wants whole lines. Appending is
//!   amortized O(1); inserting or deleting within a line is O(line length).
//!
//! - **No undo, no line endings.** Lines never contain `\n`. Joining with
//!   `\n` on save is [`file`](crate::file)'s job.

use crate::position::Position;
use crate::viewport::Viewport;

// ---------------------------------------------------------------------------
// Char/byte helpers
// ---------------------------------------------------------------------------

/// Byte offset of char index `idx` in `text`, clamped to `text.len()`.
fn byte_offset(text: &str, idx: usize) -> usize {
    text.char_indices().nth(idx).map_or(text.len(), |(b, _)| b)
}

/// Chars `[from, to)` of `text`, clamped to its length.
fn char_slice(text: &str, from: usize, to: usize) -> &str {
    if from >= to {
        return "";
    }
    let start = byte_offset(text, from);
    let end = byte_offset(text, to);
    &text[start..end]
}

/// Number of chars in `text[..byte]`.
fn chars_before(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

// ---------------------------------------------------------------------------
// LineBuffer
// ---------------------------------------------------------------------------

/// An ordered, never-empty sequence of text lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    // -- Construction -------------------------------------------------------

    /// One empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Build a buffer from lines. No lines at all gives one empty line.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buf = Self {
            lines: lines.into_iter().map(Into::into).collect(),
        };
        if buf.lines.is_empty() {
            buf.lines.push(String::new());
        }
        buf
    }

    /// Swap in a whole new set of lines (used on load).
    pub fn replace(&mut self, lines: Vec<String>) {
        self.lines = lines;
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }

    // -- Queries ------------------------------------------------------------

    /// Number of lines. Always at least 1.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Length of `line` in chars. Lines past the end count as empty.
    #[must_use]
    pub fn cols_in_line(&self, line: usize) -> usize {
        self.line(line).map_or(0, |text| text.chars().count())
    }

    /// Text of a 1-indexed line.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// All lines, first to last.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` before `pos.column` on `pos.line`.
    ///
    /// Inserting on the line just past the end (`line_count() + 1`) first
    /// appends an empty line. Columns past the end of the line append.
    pub fn insert(&mut self, ch: char, pos: Position) {
        if pos.line == self.lines.len() + 1 {
            self.lines.push(String::new());
        }
        let Some(text) = pos.line.checked_sub(1).and_then(|idx| self.lines.get_mut(idx)) else {
            return;
        };
        let at = byte_offset(text, pos.column.saturating_sub(1));
        text.insert(at, ch);
    }

    /// Delete the char at `pos`, or the line break after the line.
    ///
    /// When `pos.column` is past the last char, the next line (if any) is
    /// appended to this one and removed. On the last line that is a no-op.
    /// Returns `true` when a line break was removed.
    pub fn delete_at(&mut self, pos: Position) -> bool {
        let Some(idx) = pos.line.checked_sub(1).filter(|&i| i < self.lines.len()) else {
            return false;
        };

        if pos.column > self.cols_in_line(pos.line) {
            if idx + 1 < self.lines.len() {
                let next = self.lines.remove(idx + 1);
                self.lines[idx].push_str(&next);
                return true;
            }
            return false;
        }

        let text = &mut self.lines[idx];
        let at = byte_offset(text, pos.column.saturating_sub(1));
        text.remove(at);
        false
    }

    /// Split line `line - 1` at `column`, creating line `line`.
    ///
    /// Chars before `column` stay; chars from `column` onward become the new
    /// line. `line` is the number the new line will have, i.e. the cursor's
    /// line plus one.
    pub fn insert_line_break(&mut self, line: usize, column: usize) {
        let Some(prev) = line.checked_sub(2).filter(|&i| i < self.lines.len()) else {
            return;
        };
        let text = &mut self.lines[prev];
        let at = byte_offset(text, column.saturating_sub(1));
        let tail = text.split_off(at);
        self.lines.insert(prev + 1, tail);
    }

    // -- Search -------------------------------------------------------------

    /// First occurrence of `needle` at or after `from`.
    ///
    /// Scans the rest of `from.line` starting at `from.column`, then every
    /// following line from its start. Literal, case-sensitive. An empty
    /// needle never matches.
    #[must_use]
    pub fn search(&self, needle: &str, from: Position) -> Option<Position> {
        if needle.is_empty() {
            return None;
        }
        let first = from.line.checked_sub(1)?;
        let text = self.lines.get(first)?;

        let start = byte_offset(text, from.column.saturating_sub(1));
        if let Some(found) = text[start..].find(needle) {
            let column = chars_before(text, start + found) + 1;
            return Some(Position::new(from.line, column));
        }

        self.lines
            .iter()
            .enumerate()
            .skip(first + 1)
            .find_map(|(idx, text)| {
                text.find(needle)
                    .map(|found| Position::new(idx + 1, chars_before(text, found) + 1))
            })
    }

    /// Last occurrence of `needle` strictly before `from`.
    ///
    /// Scans the part of `from.line` left of `from.column`, then every
    /// preceding line from the end, nearest first.
    #[must_use]
    pub fn search_backward(&self, needle: &str, from: Position) -> Option<Position> {
        if needle.is_empty() {
            return None;
        }
        let first = from.line.checked_sub(1)?;
        let text = self.lines.get(first)?;

        let end = byte_offset(text, from.column.saturating_sub(1));
        if let Some(found) = text[..end].rfind(needle) {
            let column = chars_before(text, found) + 1;
            return Some(Position::new(from.line, column));
        }

        self.lines[..first]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, text)| {
                text.rfind(needle)
                    .map(|found| Position::new(idx + 1, chars_before(text, found) + 1))
            })
    }

    // -- Clipping -----------------------------------------------------------

    /// The visible part of every line inside the viewport, top to bottom.
    ///
    /// Only lines that exist are returned, so a short buffer yields fewer
    /// rows than the viewport is tall. Lines shorter than `left` yield `""`.
    #[must_use]
    pub fn clipped_slice(&self, viewport: &Viewport) -> Vec<&str> {
        let end = viewport.bottom().min(self.lines.len());
        let start = viewport.top().min(end);
        self.lines[start..end]
            .iter()
            .map(|text| char_slice(text, viewport.left(), viewport.right()))
            .collect()
    }

    /// The visible part of one line, `""` if it does not exist.
    #[must_use]
    pub fn clipped_line(&self, line: usize, viewport: &Viewport) -> &str {
        self.line(line)
            .map_or("", |text| char_slice(text, viewport.left(), viewport.right()))
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
