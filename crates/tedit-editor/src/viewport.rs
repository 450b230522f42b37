//! Viewport: which part of the buffer is on screen.
//!
//! A `Viewport` is a rectangle in buffer coordinates: rows `top..bottom`
//! and columns `left..right`, all 0-based offsets with exclusive ends. Buffer
//! line `l` (1-indexed) is drawn on screen row `l - top`, column `c` on
//! screen column `c - left`, which are exactly the 1-based coordinates the
//! terminal's cursor-position sequence takes.
//!
//! ```text
//!          left            right
//!   top  ┌──┼───────────────┼──┐
//!        │  │  visible text │  │  lines top+1 ..= bottom
//! bottom └──┼───────────────┼──┘
//! ```
//!
//! # Recentering
//!
//! The viewport does not follow the cursor one line at a time. When the
//! cursor touches or leaves an edge, the viewport jumps so the cursor sits
//! half a screen in from the edge it approached. The jump distance is the
//! *step*: half the extent, at least 1.
//!
//! Every movement reports a [`Refresh`]: whether the old screen is still
//! valid apart from the cursor line, or everything must be repainted.

use tracing::trace;

use crate::cursor::Cursor;

/// Smallest number of text rows. With one row the cursor could never rest
/// strictly inside the viewport.
const MIN_ROWS: usize = 2;

/// Smallest number of text columns, for the same reason as [`MIN_ROWS`].
const MIN_COLS: usize = 3;

/// What needs to be redrawn after a viewport update.
///
/// Ordered by cost, so several requests combine with [`Ord::max`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Refresh {
    /// Only the cursor's line (plus status and cursor placement).
    Line,
    /// The whole screen.
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    top: usize,
    bottom: usize,
    left: usize,
    right: usize,
    vertical_step: usize,
    horizontal_step: usize,
}

impl Viewport {
    /// A viewport of `rows` × `cols` at the top-left of the buffer.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut vp = Self {
            top: 0,
            bottom: 0,
            left: 0,
            right: 0,
            vertical_step: 1,
            horizontal_step: 1,
        };
        vp.set_extent(rows, cols);
        vp
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn top(&self) -> usize {
        self.top
    }

    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> usize {
        self.bottom
    }

    #[inline]
    #[must_use]
    pub const fn left(&self) -> usize {
        self.left
    }

    #[inline]
    #[must_use]
    pub const fn right(&self) -> usize {
        self.right
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.bottom - self.top
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.right - self.left
    }

    #[inline]
    #[must_use]
    pub const fn vertical_step(&self) -> usize {
        self.vertical_step
    }

    #[inline]
    #[must_use]
    pub const fn horizontal_step(&self) -> usize {
        self.horizontal_step
    }

    /// Screen (row, column) of the cursor, 1-based.
    ///
    /// Saturates at 1 if the cursor is above or left of the viewport.
    #[must_use]
    pub const fn screen_position(&self, cursor: &Cursor) -> (usize, usize) {
        (
            cursor.line().saturating_sub(self.top),
            cursor.column().saturating_sub(self.left),
        )
    }

    // -- Resizing -----------------------------------------------------------

    /// Change the extent, keeping `top`/`left`.
    ///
    /// With a cursor, the viewport is then repositioned so the cursor stays
    /// visible. Always requests a full redraw.
    pub fn resize(&mut self, rows: usize, cols: usize, cursor: Option<&Cursor>) -> Refresh {
        self.set_extent(rows, cols);
        if let Some(cursor) = cursor {
            self.set_position(cursor);
        }
        trace!(rows = self.rows(), cols = self.cols(), "viewport resized");
        Refresh::Full
    }

    fn set_extent(&mut self, rows: usize, cols: usize) {
        let rows = rows.max(MIN_ROWS);
        let cols = cols.max(MIN_COLS);
        self.bottom = self.top + rows;
        self.right = self.left + cols;
        self.vertical_step = (rows / 2).max(1);
        self.horizontal_step = (cols / 2).max(1);
    }

    // -- Following the cursor -----------------------------------------------

    /// Recenter on `cursor` if it touches or leaves an edge.
    ///
    /// Returns [`Refresh::Line`] when the viewport did not move.
    pub fn set_position(&mut self, cursor: &Cursor) -> Refresh {
        let (rows, cols) = (self.rows(), self.cols());
        let (line, column) = (cursor.line(), cursor.column());
        let mut moved = false;

        if line <= self.top || line >= self.bottom {
            self.top = line.saturating_sub(self.vertical_step);
            self.bottom = self.top + rows;
            moved = true;
        }
        if column <= self.left || column >= self.right {
            self.left = column.saturating_sub(1 + self.horizontal_step);
            self.right = self.left + cols;
            moved = true;
        }

        if moved {
            trace!(top = self.top, left = self.left, "viewport recentered");
            Refresh::Full
        } else {
            Refresh::Line
        }
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll up one step, never past the first line.
    pub fn scroll_up(&mut self) -> Refresh {
        let top = self.top.saturating_sub(self.vertical_step);
        self.move_vertical(top)
    }

    /// Scroll down one step, keeping at least one of `line_count` lines on
    /// screen.
    pub fn scroll_down(&mut self, line_count: usize) -> Refresh {
        let limit = line_count.saturating_sub(1).max(self.top);
        let top = (self.top + self.vertical_step).min(limit);
        self.move_vertical(top)
    }

    /// Scroll left one step, never past column 1.
    pub fn scroll_left(&mut self) -> Refresh {
        let left = self.left.saturating_sub(self.horizontal_step);
        self.move_horizontal(left)
    }

    /// Scroll right one step.
    pub fn scroll_right(&mut self) -> Refresh {
        let left = self.left + self.horizontal_step;
        self.move_horizontal(left)
    }

    /// Shift horizontally so `right == column + horizontal_step`.
    pub fn center_horizontal(&mut self, column: usize) -> Refresh {
        let left = (column + self.horizontal_step).saturating_sub(self.cols());
        self.move_horizontal(left)
    }

    fn move_vertical(&mut self, top: usize) -> Refresh {
        if top == self.top {
            return Refresh::Line;
        }
        let rows = self.rows();
        self.top = top;
        self.bottom = top + rows;
        Refresh::Full
    }

    fn move_horizontal(&mut self, left: usize) -> Refresh {
        if left == self.left {
            return Refresh::Line;
        }
        let cols = self.cols();
        self.left = left;
        self.right = left + cols;
        Refresh::Full
    }
}
