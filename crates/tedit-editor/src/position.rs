//! Buffer positions.
//!
//! All coordinates are **1-indexed**: line 1 is the first line, column 1 is
//! the first character. This is what the status line shows and what the
//! terminal's cursor-position sequence expects, so no conversion happens
//! between the model and the screen. The conversion to 0-based `Vec` and
//! char indices is private to [`LineBuffer`](crate::buffer::LineBuffer).
//!
//! Columns count `char`s. A line of length `L` has valid cursor columns
//! `1..=L + 1`, where `L + 1` is the insertion point after the last char.

use std::fmt;

/// A position in a line buffer: (line, column), both 1-indexed.
///
/// # Ordering
///
/// Positions are ordered line first, then column, so
/// `Position::new(1, 9) < Position::new(2, 1)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Line 1, column 1.
    pub const ORIGIN: Self = Self { line: 1, column: 1 };

    /// Create a new position.
    #[inline]
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_one_one() {
        assert_eq!(Position::ORIGIN, Position::new(1, 1));
        assert_eq!(Position::default(), Position::ORIGIN);
    }

    #[test]
    fn ordering_is_line_major() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(3, 2) < Position::new(3, 3));
        assert_eq!(
            Position::new(2, 5).cmp(&Position::new(2, 5)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn display_and_debug() {
        let p = Position::new(12, 4);
        assert_eq!(p.to_string(), "12:4");
        assert_eq!(format!("{p:?}"), "Pos(12:4)");
    }
}
