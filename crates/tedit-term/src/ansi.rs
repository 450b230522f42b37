// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. This module only knows the byte-level
// encoding of the handful of commands the editor needs: cursor position,
// erase display, erase line, and SGR rendition.
//
// Screen coordinates here are 1-based, exactly as the terminal expects them.
// The renderer already works in 1-based rows and columns, so there is no
// conversion step.
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).

use std::io::{self, Write};

use crate::style::Style;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(row, col)` using CUP. Both are 1-based.
#[inline]
pub fn cursor_to(w: &mut impl Write, row: usize, col: usize) -> io::Result<()> {
    write!(w, "\x1b[{row};{col}H")
}

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

// ─── Erase ───────────────────────────────────────────────────────────────────

/// Which part of the display or line an erase affects.
///
/// The discriminant is the ED/EL parameter value. The editor always
/// repaints whole rows, so only the full erase is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EraseMode {
    /// Everything.
    All = 2,
}

/// Erase in display (ED).
#[inline]
pub fn erase(w: &mut impl Write, mode: EraseMode) -> io::Result<()> {
    write!(w, "\x1b[{}J", mode as u8)
}

/// Erase in line (EL).
#[inline]
pub fn erase_line(w: &mut impl Write, mode: EraseMode) -> io::Result<()> {
    write!(w, "\x1b[{}K", mode as u8)
}

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    erase(w, EraseMode::All)
}

// ─── Rendition ───────────────────────────────────────────────────────────────

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Emit a style as a single SGR sequence.
///
/// Attribute codes come first, then the foreground color:
/// `\x1b[7;31m` for inverse red. Does nothing for a plain style.
pub fn style(w: &mut impl Write, style: Style) -> io::Result<()> {
    if style.is_plain() {
        return Ok(());
    }

    let mut codes = style.attrs.sgr_codes();
    if let Some(fg) = style.fg.fg_code() {
        codes.push(fg);
    }

    w.write_all(b"\x1b[")?;
    for (i, code) in codes.iter().enumerate() {
        if i > 0 {
            w.write_all(b";")?;
        }
        write!(w, "{code}")?;
    }
    w.write_all(b"m")
}

/// Write `text` in `style`, then reset.
///
/// A plain style writes the text untouched, without a trailing reset.
pub fn styled(w: &mut impl Write, s: Style, text: &str) -> io::Result<()> {
    if s.is_plain() {
        return w.write_all(text.as_bytes());
    }
    style(w, s)?;
    w.write_all(text.as_bytes())?;
    reset(w)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
