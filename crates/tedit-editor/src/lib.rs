//! # tedit-editor: Editor core for tedit
//!
//! The model and its projection onto the screen:
//!
//! - **[`position`]**: `Position` (line, column), 1-indexed
//! - **[`buffer`]**: `LineBuffer`, a never-empty list of lines with editing
//!   and literal search
//! - **[`cursor`]**: `Cursor` movement, clamped against a borrowed buffer
//! - **[`viewport`]**: the visible rectangle, recentering and scrolling
//! - **[`render`]**: `Frame` to ANSI bytes, full or single-line, plus the
//!   status line
//! - **[`file`]**: load and save

pub mod buffer;
pub mod cursor;
pub mod file;
pub mod position;
pub mod render;
pub mod viewport;
