// SPDX-License-Identifier: MIT
//
// Editor: command dispatch on top of the editing engine.
//
// The Editor owns the buffer, the cursor and the viewport, and implements
// tedit-term's App trait. Each command flows through:
//
//   Command → prompt or edit dispatch → buffer/cursor mutation
//           → viewport adjustment (Refresh) → render::paint / paint_line
//
// A prompt (search, save as, open, goto line) takes over the status line
// until it is accepted or cancelled. While a prompt is open, commands go to
// the prompt first; incremental search hands anything it does not consume
// back to the normal dispatch after closing itself.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use tedit_editor::buffer::LineBuffer;
use tedit_editor::cursor::Cursor;
use tedit_editor::file::{self, FileError};
use tedit_editor::position::Position;
use tedit_editor::render::{self, Frame, StatusLine};
use tedit_editor::viewport::{Refresh, Viewport};

use tedit_term::event_loop::{Action, App};
use tedit_term::input::Command;
use tedit_term::output::OutputBuffer;
use tedit_term::terminal::Size;

// ─── Prompts ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    /// Incremental search. `origin` is where the cursor was when the search
    /// started; every edit of the search text searches from there again.
    Search {
        direction: Direction,
        origin: Position,
        failing: bool,
    },
    SaveAs,
    LoadAs,
    GotoLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Prompt {
    kind: PromptKind,
    input: String,
}

impl Prompt {
    const fn new(kind: PromptKind, input: String) -> Self {
        Self { kind, input }
    }

    fn status(&self) -> StatusLine {
        let label = match self.kind {
            PromptKind::Search {
                direction,
                failing,
                ..
            } => match (failing, direction) {
                (false, Direction::Forward) => "I-search",
                (false, Direction::Backward) => "I-search backward",
                (true, Direction::Forward) => "Failing I-search",
                (true, Direction::Backward) => "Failing I-search backward",
            },
            PromptKind::SaveAs => "Save as",
            PromptKind::LoadAs => "Open file",
            PromptKind::GotoLine => "Goto line",
        };
        StatusLine::prompt(format!("{label}: {}", self.input))
    }
}

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The editor application state.
pub struct Editor {
    buffer: LineBuffer,
    cursor: Cursor,
    viewport: Viewport,
    size: Size,

    /// Where save and load go by default. Reset after a failed save or load.
    filename: Option<PathBuf>,

    /// Shown after the cursor position when no prompt is open.
    status: StatusLine,

    prompt: Option<Prompt>,
}

impl Editor {
    /// An editor with an empty buffer on a terminal of `size`.
    pub fn new(size: Size) -> Self {
        let mut editor = Self {
            buffer: LineBuffer::new(),
            cursor: Cursor::new(),
            viewport: Viewport::new(0, 0),
            size,
            filename: None,
            status: StatusLine::default(),
            prompt: None,
        };
        editor.viewport = editor.fresh_viewport();
        editor
    }

    /// An editor on `path`.
    ///
    /// A missing file starts an empty buffer that will be saved under that
    /// name. Any other load error leaves the buffer empty and shows the
    /// error in the status line.
    pub fn open(path: &Path, size: Size) -> Self {
        let mut editor = Self::new(size);
        match file::load(path) {
            Ok(lines) => {
                editor.buffer.replace(lines);
                editor.filename = Some(path.to_path_buf());
                editor.status = editor.idle_status();
            }
            Err(e) if e.is_not_found() => {
                info!(path = %path.display(), "new file");
                editor.filename = Some(path.to_path_buf());
                editor.status = StatusLine::info(format!("{} (new file)", path.display()));
            }
            Err(e) => {
                warn!("{e}");
                editor.status = StatusLine::error(e.to_string());
            }
        }
        editor
    }

    fn fresh_viewport(&self) -> Viewport {
        let (rows, cols) = self.text_area();
        Viewport::new(rows, cols)
    }

    /// Text area in (rows, cols): the terminal minus the status row.
    fn text_area(&self) -> (usize, usize) {
        (
            usize::from(self.size.rows).saturating_sub(1),
            usize::from(self.size.cols),
        )
    }

    fn idle_status(&self) -> StatusLine {
        self.filename
            .as_deref()
            .map_or_else(StatusLine::default, |p| {
                StatusLine::info(p.display().to_string())
            })
    }

    fn filename_text(&self) -> String {
        self.filename
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    // ── Painting ───────────────────────────────────────────────────────

    fn paint(&self, refresh: Refresh, out: &mut OutputBuffer) -> io::Result<()> {
        let status = self
            .prompt
            .as_ref()
            .map_or_else(|| self.status.clone(), Prompt::status);
        let frame = Frame {
            viewport: &self.viewport,
            buffer: &self.buffer,
            cursor: &self.cursor,
            status: &status,
            size: self.size,
        };
        match refresh {
            Refresh::Line => render::paint_line(&frame, out),
            Refresh::Full => render::paint(&frame, out),
        }
    }

    // ── Dispatch ───────────────────────────────────────────────────────

    fn dispatch(&mut self, command: Command) -> Refresh {
        if self.prompt.is_some() {
            return self.handle_prompt(command);
        }
        self.handle_edit(command)
    }

    fn follow_cursor(&mut self) -> Refresh {
        self.viewport.set_position(&self.cursor)
    }

    fn handle_edit(&mut self, command: Command) -> Refresh {
        self.status = self.idle_status();

        match command {
            Command::Char(ch) => self.insert_char(ch),
            Command::Backspace => self.backspace(),
            Command::DeleteForward => {
                if self.buffer.delete_at(self.cursor.position()) {
                    Refresh::Full
                } else {
                    Refresh::Line
                }
            }
            Command::Return => self.line_break(),

            Command::Up => {
                self.cursor.up(&self.buffer);
                self.follow_cursor()
            }
            Command::Down => {
                self.cursor.down(&self.buffer);
                self.follow_cursor()
            }
            Command::Forward => {
                self.cursor.forward(&self.buffer);
                self.follow_cursor()
            }
            Command::Back => {
                self.cursor.back(&self.buffer);
                self.follow_cursor()
            }
            Command::LineBegin => {
                self.cursor.line_begin();
                self.follow_cursor()
            }
            Command::LineEnd => {
                self.cursor.line_end(&self.buffer);
                self.follow_cursor()
            }
            Command::BufferBegin => {
                self.cursor.jump_begin_of_buffer();
                self.follow_cursor()
            }
            Command::BufferEnd => {
                self.cursor.jump_end_of_buffer(&self.buffer);
                self.follow_cursor()
            }
            Command::PageDown => {
                self.viewport.scroll_down(self.buffer.line_count());
                self.pull_cursor_into_view()
            }
            Command::PageUp => {
                self.viewport.scroll_up();
                self.pull_cursor_into_view()
            }

            Command::Symbol(byte) => {
                self.status = StatusLine::info(format!("symbol ({byte})"));
                Refresh::Line
            }

            Command::FindForward => self.start_search(Direction::Forward),
            Command::FindBackward => self.start_search(Direction::Backward),
            Command::SaveAs => self.open_prompt(PromptKind::SaveAs, self.filename_text()),
            Command::LoadAs => self.open_prompt(PromptKind::LoadAs, self.filename_text()),
            Command::GotoLine => self.open_prompt(PromptKind::GotoLine, String::new()),

            Command::Resize => Refresh::Full,
            Command::Cancel | Command::Quit => Refresh::Line,
        }
    }

    // ── Editing ────────────────────────────────────────────────────────

    fn insert_char(&mut self, ch: char) -> Refresh {
        self.buffer.insert(ch, self.cursor.position());
        self.cursor.forward(&self.buffer);
        if self.cursor.column() >= self.viewport.right() {
            self.viewport.scroll_right()
        } else {
            self.follow_cursor()
        }
    }

    fn backspace(&mut self) -> Refresh {
        if self.cursor.is_at_start_of_buffer() {
            return Refresh::Line;
        }
        self.cursor.back(&self.buffer);
        let merged = self.buffer.delete_at(self.cursor.position());

        let column = self.cursor.column();
        let shifted = if column >= self.viewport.right() {
            self.viewport.center_horizontal(column)
        } else if self.viewport.left() > 0 && column == self.viewport.left() + 1 {
            self.viewport.scroll_left()
        } else {
            Refresh::Line
        };

        let moved = shifted.max(self.follow_cursor());
        if merged { Refresh::Full } else { moved }
    }

    fn line_break(&mut self) -> Refresh {
        let Position { line, column } = self.cursor.position();
        self.buffer.insert_line_break(line + 1, column);
        self.cursor
            .jump_to(Position::new(line + 1, 1), &self.buffer);
        self.follow_cursor();
        Refresh::Full
    }

    /// After a page scroll, move the cursor onto the nearest line the
    /// viewport can hold it on.
    fn pull_cursor_into_view(&mut self) -> Refresh {
        let lo = self.viewport.top() + 1;
        let hi = self.viewport.bottom().saturating_sub(1).max(lo);
        let line = self.cursor.line().clamp(lo, hi);
        let target = Position::new(line, self.cursor.column());
        self.cursor.jump_to(target, &self.buffer);
        self.follow_cursor();
        Refresh::Full
    }

    // ── Prompts ────────────────────────────────────────────────────────

    fn open_prompt(&mut self, kind: PromptKind, input: String) -> Refresh {
        debug!(?kind, "prompt opened");
        self.prompt = Some(Prompt::new(kind, input));
        Refresh::Line
    }

    fn close_prompt(&mut self) {
        self.prompt = None;
        self.status = self.idle_status();
    }

    fn start_search(&mut self, direction: Direction) -> Refresh {
        self.open_prompt(
            PromptKind::Search {
                direction,
                origin: self.cursor.position(),
                failing: false,
            },
            String::new(),
        )
    }

    fn handle_prompt(&mut self, command: Command) -> Refresh {
        let Some(prompt) = self.prompt.as_mut() else {
            return self.handle_edit(command);
        };

        match prompt.kind {
            PromptKind::Search {
                direction, origin, ..
            } => self.handle_search(command, direction, origin),
            kind => {
                match command {
                    Command::Char(ch) => {
                        if kind != PromptKind::GotoLine || ch.is_ascii_digit() {
                            prompt.input.push(ch);
                        }
                    }
                    Command::Backspace => {
                        prompt.input.pop();
                    }
                    Command::Return => {
                        let input = std::mem::take(&mut prompt.input);
                        self.close_prompt();
                        return self.accept_prompt(kind, &input);
                    }
                    Command::Cancel => {
                        self.close_prompt();
                        self.status = StatusLine::info("Cancelled");
                    }
                    _ => {}
                }
                Refresh::Line
            }
        }
    }

    fn accept_prompt(&mut self, kind: PromptKind, input: &str) -> Refresh {
        match kind {
            PromptKind::SaveAs => self.save_as(input),
            PromptKind::LoadAs => self.load_from(input),
            PromptKind::GotoLine => {
                if input.is_empty() {
                    return Refresh::Line;
                }
                // Digits only, so the only parse failure is overflow.
                let n = input.parse().unwrap_or(usize::MAX);
                self.cursor.jump_to_line(n, &self.buffer);
                self.follow_cursor()
            }
            PromptKind::Search { .. } => Refresh::Line,
        }
    }

    fn handle_search(&mut self, command: Command, direction: Direction, origin: Position) -> Refresh {
        match command {
            Command::Char(ch) => {
                self.edit_search(|input| input.push(ch));
                self.search_from(direction, origin, false)
            }
            Command::Backspace => {
                self.edit_search(|input| {
                    input.pop();
                });
                self.search_from(direction, origin, false)
            }
            Command::FindForward => {
                let from = self.cursor.position();
                self.search_from(
                    Direction::Forward,
                    Position::new(from.line, from.column + 1),
                    true,
                )
            }
            Command::FindBackward => {
                self.search_from(Direction::Backward, self.cursor.position(), true)
            }
            Command::Return => {
                self.close_prompt();
                Refresh::Line
            }
            Command::Cancel => {
                self.close_prompt();
                self.cursor.jump_to(origin, &self.buffer);
                self.follow_cursor()
            }
            other => {
                self.close_prompt();
                self.handle_edit(other)
            }
        }
    }

    fn edit_search(&mut self, f: impl FnOnce(&mut String)) {
        if let Some(prompt) = self.prompt.as_mut() {
            f(&mut prompt.input);
        }
    }

    /// Search for the prompt text starting at `from` and move the cursor to
    /// the match. `repeat` distinguishes Ctrl-S/Ctrl-R from typing: typing
    /// keeps the original origin, repeating searches onward from the cursor.
    fn search_from(&mut self, direction: Direction, from: Position, repeat: bool) -> Refresh {
        let Some(prompt) = self.prompt.as_ref() else {
            return Refresh::Line;
        };
        let PromptKind::Search { origin, .. } = prompt.kind else {
            return Refresh::Line;
        };

        let needle = prompt.input.clone();
        if needle.is_empty() && !repeat {
            self.set_search_state(direction, origin, false);
            self.cursor.jump_to(origin, &self.buffer);
            return self.follow_cursor();
        }

        let found = match direction {
            Direction::Forward => self.buffer.search(&needle, from),
            Direction::Backward => self.buffer.search_backward(&needle, from),
        };

        match found {
            Some(pos) => {
                debug!(%pos, %needle, "search hit");
                self.set_search_state(direction, origin, false);
                self.cursor.jump_to(pos, &self.buffer);
                self.follow_cursor()
            }
            None => {
                debug!(%needle, "search failed");
                self.set_search_state(direction, origin, true);
                Refresh::Line
            }
        }
    }

    fn set_search_state(&mut self, direction: Direction, origin: Position, failing: bool) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.kind = PromptKind::Search {
                direction,
                origin,
                failing,
            };
        }
    }

    // ── Files ──────────────────────────────────────────────────────────

    fn save_as(&mut self, input: &str) -> Refresh {
        if input.is_empty() {
            self.status = StatusLine::error("No file name");
            return Refresh::Line;
        }
        let path = PathBuf::from(input);
        match file::save(&path, self.buffer.lines()) {
            Ok(()) => {
                self.status = StatusLine::info(format!(
                    "Wrote {} lines to {}",
                    self.buffer.line_count(),
                    path.display()
                ));
                self.filename = Some(path);
            }
            Err(e) => self.file_failed(&e),
        }
        Refresh::Line
    }

    fn load_from(&mut self, input: &str) -> Refresh {
        if input.is_empty() {
            self.status = StatusLine::error("No file name");
            return Refresh::Line;
        }
        let path = PathBuf::from(input);
        match file::load(&path) {
            Ok(lines) => {
                self.buffer.replace(lines);
                self.cursor = Cursor::new();
                self.viewport = self.fresh_viewport();
                self.filename = Some(path);
                self.status = self.idle_status();
                Refresh::Full
            }
            Err(e) => {
                self.file_failed(&e);
                Refresh::Line
            }
        }
    }

    fn file_failed(&mut self, e: &FileError) {
        warn!("{e}");
        self.filename = None;
        self.status = StatusLine::error(e.to_string());
    }
}

// ─── App implementation ─────────────────────────────────────────────────────

impl App for Editor {
    fn on_start(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        self.paint(Refresh::Full, out)
    }

    fn on_command(&mut self, command: Command, out: &mut OutputBuffer) -> io::Result<Action> {
        let refresh = self.dispatch(command);
        self.paint(refresh, out)?;
        Ok(Action::Continue)
    }

    fn on_resize(&mut self, size: Size, out: &mut OutputBuffer) -> io::Result<()> {
        self.size = size;
        let (rows, cols) = self.text_area();
        let refresh = self.viewport.resize(rows, cols, Some(&self.cursor));
        self.paint(refresh, out)
    }

    fn on_exit(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        render::clear(out)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
