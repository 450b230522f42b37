//! Renderer: buffer, cursor and viewport to terminal bytes.
//!
//! Rendering is a pure function of a [`Frame`]: it reads the model and writes
//! ANSI sequences into any `Write`. There is no screen diffing. A full paint
//! erases the screen and redraws every visible row; a line paint redraws the
//! cursor's row only. Both finish with the status line and the final cursor
//! placement, so the terminal cursor always ends up on the insertion point.
//!
//! Text reaches the terminal one char per cell. Control characters (TAB,
//! ESC, C1 such as U+009B) are drawn as [`CONTROL_PLACEHOLDER`], which keeps
//! the screen column equal to the buffer column and keeps file contents
//! from acting as terminal commands.
//!
//! ```text
//! row 1        │ clipped line top+1
//! ...          │ ...
//! row rows-1   │ clipped line bottom
//! row rows     │  tedit: (L3 C7) notes.txt        ← inverse video
//! ```

use std::io::{self, Write};

use tedit_term::ansi::{self, EraseMode};
use tedit_term::style::{Attr, Color, Style};
use tedit_term::terminal::Size;

use crate::buffer::LineBuffer;
use crate::cursor::Cursor;
use crate::viewport::Viewport;

/// Drawn in place of any char for which [`char::is_control`] holds.
pub const CONTROL_PLACEHOLDER: char = '?';

fn printable(ch: char) -> char {
    if ch.is_control() {
        CONTROL_PLACEHOLDER
    } else {
        ch
    }
}

fn write_printable(out: &mut impl Write, text: &str) -> io::Result<()> {
    if !text.chars().any(char::is_control) {
        return out.write_all(text.as_bytes());
    }
    let shown: String = text.chars().map(printable).collect();
    out.write_all(shown.as_bytes())
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// How the status message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    /// Filename or feedback.
    #[default]
    Info,
    /// Failed load/save. Drawn in red.
    Error,
    /// Text the user is typing into a prompt.
    Prompt,
}

/// The context text after the cursor position in the status line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub kind: MessageKind,
    pub message: String,
}

impl StatusLine {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            message: message.into(),
        }
    }

    pub fn prompt(message: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Prompt,
            message: message.into(),
        }
    }

    const fn style(&self) -> Style {
        match self.kind {
            MessageKind::Info | MessageKind::Prompt => Style::INVERSE,
            MessageKind::Error => Style {
                fg: Color::Red,
                attrs: Attr::INVERSE,
            },
        }
    }
}

/// Status text for `cursor`, padded or truncated to exactly `cols` chars.
#[must_use]
pub fn status_text(cursor: &Cursor, status: &StatusLine, cols: usize) -> String {
    let text = format!(
        " tedit: (L{} C{}) {}",
        cursor.line(),
        cursor.column(),
        status.message
    );
    let mut fitted: String = text.chars().take(cols).map(printable).collect();
    let len = fitted.chars().count();
    fitted.extend(std::iter::repeat_n(' ', cols - len));
    fitted
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Everything needed to draw one screen.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub viewport: &'a Viewport,
    pub buffer: &'a LineBuffer,
    pub cursor: &'a Cursor,
    pub status: &'a StatusLine,
    pub size: Size,
}

impl Frame<'_> {
    /// Rows available for text: everything but the status row.
    fn text_rows(&self) -> usize {
        usize::from(self.size.rows).saturating_sub(1)
    }
}

/// Repaint the whole screen.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn paint(frame: &Frame<'_>, out: &mut impl Write) -> io::Result<()> {
    ansi::erase(out, EraseMode::All)?;
    let rows = frame.buffer.clipped_slice(frame.viewport);
    for (i, text) in rows.iter().take(frame.text_rows()).enumerate() {
        ansi::cursor_to(out, i + 1, 1)?;
        write_printable(out, text)?;
    }
    paint_status(frame, out)?;
    place_cursor(frame, out)
}

/// Repaint only the cursor's line, the status line and the cursor.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn paint_line(frame: &Frame<'_>, out: &mut impl Write) -> io::Result<()> {
    let (row, _) = frame.viewport.screen_position(frame.cursor);
    ansi::cursor_to(out, row, 1)?;
    ansi::erase_line(out, EraseMode::All)?;
    let text = frame
        .buffer
        .clipped_line(frame.cursor.line(), frame.viewport);
    write_printable(out, text)?;
    paint_status(frame, out)?;
    place_cursor(frame, out)
}

/// Erase the screen and home the cursor.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn clear(out: &mut impl Write) -> io::Result<()> {
    ansi::clear_screen(out)?;
    ansi::cursor_home(out)
}

fn paint_status(frame: &Frame<'_>, out: &mut impl Write) -> io::Result<()> {
    let cols = usize::from(frame.size.cols);
    ansi::cursor_to(out, usize::from(frame.size.rows), 1)?;
    let text = status_text(frame.cursor, frame.status, cols);
    ansi::styled(out, frame.status.style(), &text)
}

fn place_cursor(frame: &Frame<'_>, out: &mut impl Write) -> io::Result<()> {
    let (row, col) = frame.viewport.screen_position(frame.cursor);
    ansi::cursor_to(out, row.max(1), col.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use pretty_assertions::assert_eq;

    struct Scene {
        viewport: Viewport,
        buffer: LineBuffer,
        cursor: Cursor,
        status: StatusLine,
        size: Size,
    }

    impl Scene {
        fn new(lines: &[&str], cols: u16, rows: u16) -> Self {
            Self {
                viewport: Viewport::new(usize::from(rows) - 1, usize::from(cols)),
                buffer: LineBuffer::from_lines(lines.iter().copied()),
                cursor: Cursor::new(),
                status: StatusLine::info("f.txt"),
                size: Size::new(cols, rows),
            }
        }

        fn frame(&self) -> Frame<'_> {
            Frame {
                viewport: &self.viewport,
                buffer: &self.buffer,
                cursor: &self.cursor,
                status: &self.status,
                size: self.size,
            }
        }

        fn paint(&self) -> String {
            let mut out = Vec::new();
            paint(&self.frame(), &mut out).unwrap();
            String::from_utf8(out).unwrap()
        }

        fn paint_line(&self) -> String {
            let mut out = Vec::new();
            paint_line(&self.frame(), &mut out).unwrap();
            String::from_utf8(out).unwrap()
        }
    }

    #[test]
    fn status_text_pads_to_width() {
        let text = status_text(&Cursor::new(), &StatusLine::info("x"), 24);
        assert_eq!(text, " tedit: (L1 C1) x       ");
        assert_eq!(text.chars().count(), 24);
    }

    #[test]
    fn status_text_truncates() {
        let text = status_text(&Cursor::new(), &StatusLine::info("long name"), 10);
        assert_eq!(text, " tedit: (L");
    }

    #[test]
    fn full_paint_layout() {
        let scene = Scene::new(&["hello", "world"], 24, 4);
        assert_eq!(
            scene.paint(),
            concat!(
                "\x1b[2J",
                "\x1b[1;1Hhello",
                "\x1b[2;1Hworld",
                "\x1b[4;1H\x1b[7m tedit: (L1 C1) f.txt   \x1b[0m",
                "\x1b[1;1H",
            )
        );
    }

    #[test]
    fn full_paint_clips_to_viewport() {
        let mut scene = Scene::new(&["abcdefghij"], 5, 3);
        scene.cursor.jump_to(Position::new(1, 5), &scene.buffer);
        scene.viewport.set_position(&scene.cursor);
        // cols 5, step 2: left = 5 - 1 - 2 = 2.
        let out = scene.paint();
        assert!(out.contains("\x1b[1;1Hcdefg"), "{out:?}");
        assert!(out.ends_with("\x1b[1;3H"), "{out:?}");
    }

    #[test]
    fn line_paint_redraws_cursor_row() {
        let mut scene = Scene::new(&["one", "two", "three"], 24, 6);
        scene.cursor.jump_to(Position::new(2, 3), &scene.buffer);
        assert_eq!(
            scene.paint_line(),
            concat!(
                "\x1b[2;1H\x1b[2K",
                "two",
                "\x1b[6;1H\x1b[7m tedit: (L2 C3) f.txt   \x1b[0m",
                "\x1b[2;3H",
            )
        );
    }

    #[test]
    fn error_status_is_red() {
        let mut scene = Scene::new(&[""], 12, 3);
        scene.status = StatusLine::error("boom");
        assert!(scene.paint().contains("\x1b[7;31m tedit: (L1"));
    }

    #[test]
    fn scrolled_paint_numbers_rows_from_one() {
        let lines = ["l1", "l2", "l3", "l4", "l5"];
        let mut scene = Scene::new(&lines, 20, 5);
        scene.cursor.jump_to(Position::new(5, 1), &scene.buffer);
        scene.viewport.set_position(&scene.cursor);
        let out = scene.paint();
        assert!(out.contains("\x1b[1;1Hl4\x1b[2;1Hl5"), "{out:?}");
        assert!(out.ends_with("\x1b[2;1H"), "{out:?}");
    }

    #[test]
    fn control_chars_are_drawn_as_placeholders() {
        let scene = Scene::new(&["a\tb", "x\x1b[2Jy", "c\u{9b}2J"], 24, 5);
        let out = scene.paint();
        assert!(!out.contains('\t'), "{out:?}");
        assert!(!out.contains('\u{9b}'), "{out:?}");
        assert!(
            out.contains("\x1b[1;1Ha?b\x1b[2;1Hx?[2Jy\x1b[3;1Hc?2J\x1b[5;1H"),
            "{out:?}"
        );
        // The only ED 2 is the one that starts the paint.
        assert_eq!(out.matches("\x1b[2J").count(), 1, "{out:?}");
    }

    #[test]
    fn cursor_after_tab_stays_on_buffer_column() {
        let mut scene = Scene::new(&["\tab"], 24, 3);
        scene.cursor.jump_to(Position::new(1, 3), &scene.buffer);
        let out = scene.paint_line();
        assert!(out.starts_with("\x1b[1;1H\x1b[2K?ab"), "{out:?}");
        assert!(out.ends_with("\x1b[1;3H"), "{out:?}");
    }

    #[test]
    fn status_text_hides_control_chars() {
        let text = status_text(&Cursor::new(), &StatusLine::error("bad\x1b[31m\n"), 25);
        assert_eq!(text, " tedit: (L1 C1) bad?[31m?");
    }

    #[test]
    fn clear_homes_cursor() {
        let mut out = Vec::new();
        clear(&mut out).unwrap();
        assert_eq!(out, b"\x1b[2J\x1b[H");
    }
}
