//! Cursor: the insertion point.
//!
//! The cursor is a bare [`Position`]. It never holds a reference to the
//! buffer; every movement that needs bounds borrows the [`LineBuffer`] for
//! the duration of the call and never mutates it.
//!
//! Invariant, after any movement against a buffer `b`:
//! `1 <= line <= b.line_count()` and `1 <= column <= b.cols_in_line(line) + 1`.

use crate::buffer::LineBuffer;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    position: Position,
}

impl Cursor {
    /// A cursor at (1, 1).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: Position::ORIGIN,
        }
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.position.line
    }

    #[inline]
    #[must_use]
    pub const fn column(&self) -> usize {
        self.position.column
    }

    #[must_use]
    pub const fn is_at_start_of_buffer(&self) -> bool {
        self.position.line == 1 && self.position.column == 1
    }

    // -- Vertical -----------------------------------------------------------

    /// One line up, column clamped to the new line. No-op on line 1.
    pub fn up(&mut self, buf: &LineBuffer) {
        if self.position.line > 1 {
            self.position.line -= 1;
            self.clamp_column(buf);
        }
    }

    /// One line down, column clamped to the new line. No-op on the last line.
    pub fn down(&mut self, buf: &LineBuffer) {
        if self.position.line < buf.line_count() {
            self.position.line += 1;
            self.clamp_column(buf);
        }
    }

    // -- Horizontal ---------------------------------------------------------

    /// One column right, wrapping to the start of the next line.
    pub fn forward(&mut self, buf: &LineBuffer) {
        if self.position.column <= buf.cols_in_line(self.position.line) {
            self.position.column += 1;
        } else if self.position.line < buf.line_count() {
            self.position = Position::new(self.position.line + 1, 1);
        }
    }

    /// One column left, wrapping to the end of the previous line.
    pub fn back(&mut self, buf: &LineBuffer) {
        if self.position.column > 1 {
            self.position.column -= 1;
        } else if self.position.line > 1 {
            let line = self.position.line - 1;
            self.position = Position::new(line, buf.cols_in_line(line) + 1);
        }
    }

    pub const fn line_begin(&mut self) {
        self.position.column = 1;
    }

    /// Just past the last char of the current line.
    pub fn line_end(&mut self, buf: &LineBuffer) {
        self.position.column = buf.cols_in_line(self.position.line) + 1;
    }

    // -- Jumps --------------------------------------------------------------

    pub const fn jump_begin_of_buffer(&mut self) {
        self.position = Position::ORIGIN;
    }

    /// End of the last line.
    pub fn jump_end_of_buffer(&mut self, buf: &LineBuffer) {
        let line = buf.line_count();
        self.position = Position::new(line, buf.cols_in_line(line) + 1);
    }

    /// Start of line `n`, clamped to `1..=line_count()`.
    pub fn jump_to_line(&mut self, n: usize, buf: &LineBuffer) {
        self.position = Position::new(n.clamp(1, buf.line_count()), 1);
    }

    /// Move to `pos`, clamped into the buffer.
    pub fn jump_to(&mut self, pos: Position, buf: &LineBuffer) {
        self.position = pos;
        self.revalidate(buf);
    }

    /// Re-establish the bounds invariant after the buffer changed under the
    /// cursor (e.g. a load).
    pub fn revalidate(&mut self, buf: &LineBuffer) {
        self.position.line = self.position.line.clamp(1, buf.line_count());
        self.clamp_column(buf);
    }

    fn clamp_column(&mut self, buf: &LineBuffer) {
        let max = buf.cols_in_line(self.position.line) + 1;
        self.position.column = self.position.column.clamp(1, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn buf(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().copied())
    }

    fn at(line: usize, column: usize) -> Cursor {
        Cursor {
            position: Position::new(line, column),
        }
    }

    #[test]
    fn starts_at_origin() {
        let c = Cursor::new();
        assert_eq!(c.position(), Position::ORIGIN);
        assert!(c.is_at_start_of_buffer());
    }

    #[test]
    fn up_and_down_clamp_column() {
        let b = buf(&["abcdef", "ab", "abcd"]);
        let mut c = at(1, 6);
        c.down(&b);
        assert_eq!(c.position(), Position::new(2, 3));
        c.down(&b);
        // Column stays where clamping left it.
        assert_eq!(c.position(), Position::new(3, 3));
    }

    #[test]
    fn up_on_first_line_is_noop() {
        let b = buf(&["abc"]);
        let mut c = at(1, 2);
        c.up(&b);
        assert_eq!(c.position(), Position::new(1, 2));
    }

    #[test]
    fn down_on_last_line_is_noop() {
        let b = buf(&["abc", "d"]);
        let mut c = at(2, 2);
        c.down(&b);
        assert_eq!(c.position(), Position::new(2, 2));
    }

    #[test]
    fn forward_wraps_to_next_line() {
        let b = buf(&["ab", "cd"]);
        let mut c = at(1, 3);
        c.forward(&b);
        assert_eq!(c.position(), Position::new(2, 1));
    }

    #[test]
    fn forward_at_end_of_buffer_is_noop() {
        let b = buf(&["ab", "cd"]);
        let mut c = at(2, 3);
        c.forward(&b);
        assert_eq!(c.position(), Position::new(2, 3));
    }

    #[test]
    fn back_wraps_to_end_of_previous_line() {
        let b = buf(&["abc", "d"]);
        let mut c = at(2, 1);
        c.back(&b);
        assert_eq!(c.position(), Position::new(1, 4));
    }

    #[test]
    fn back_at_start_is_noop() {
        let b = buf(&["abc"]);
        let mut c = Cursor::new();
        c.back(&b);
        assert!(c.is_at_start_of_buffer());
    }

    #[test]
    fn line_begin_and_end() {
        let b = buf(&["hello"]);
        let mut c = at(1, 3);
        c.line_end(&b);
        assert_eq!(c.column(), 6);
        c.line_begin();
        assert_eq!(c.column(), 1);
    }

    #[test]
    fn buffer_begin_and_end() {
        let b = buf(&["a", "bb", "ccc"]);
        let mut c = at(2, 2);
        c.jump_end_of_buffer(&b);
        assert_eq!(c.position(), Position::new(3, 4));
        c.jump_begin_of_buffer();
        assert_eq!(c.position(), Position::ORIGIN);
    }

    #[test]
    fn jump_to_line_clamps() {
        let b = buf(&["a", "b", "c"]);
        let mut c = Cursor::new();
        c.jump_to_line(2, &b);
        assert_eq!(c.position(), Position::new(2, 1));
        c.jump_to_line(99, &b);
        assert_eq!(c.line(), 3);
        c.jump_to_line(0, &b);
        assert_eq!(c.line(), 1);
    }

    #[test]
    fn jump_to_clamps_into_buffer() {
        let b = buf(&["abc", "de"]);
        let mut c = Cursor::new();
        c.jump_to(Position::new(2, 2), &b);
        assert_eq!(c.position(), Position::new(2, 2));
        c.jump_to(Position::new(7, 40), &b);
        assert_eq!(c.position(), Position::new(2, 3));
    }

    #[test]
    fn revalidate_after_buffer_shrinks() {
        let mut c = at(10, 10);
        c.revalidate(&buf(&["xy"]));
        assert_eq!(c.position(), Position::new(1, 3));
    }

    proptest! {
        #[test]
        fn movements_keep_cursor_in_bounds(
            lines in proptest::collection::vec("[a-z]{0,6}", 1..6),
            moves in proptest::collection::vec(0u8..8, 0..40),
        ) {
            let b = LineBuffer::from_lines(lines);
            let mut c = Cursor::new();
            for m in moves {
                match m {
                    0 => c.up(&b),
                    1 => c.down(&b),
                    2 => c.forward(&b),
                    3 => c.back(&b),
                    4 => c.line_begin(),
                    5 => c.line_end(&b),
                    6 => c.jump_end_of_buffer(&b),
                    _ => c.jump_begin_of_buffer(),
                }
                prop_assert!(c.line() >= 1 && c.line() <= b.line_count());
                prop_assert!(c.column() >= 1 && c.column() <= b.cols_in_line(c.line()) + 1);
            }
        }
    }
}
