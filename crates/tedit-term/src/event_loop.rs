// SPDX-License-Identifier: MIT
//
// Event loop: one blocking read, one command, one flush.
//
// The editor is single-threaded and synchronous. The only suspension point
// is the blocking read of the next input byte; everything between two reads
// (buffer mutation, cursor movement, rendering) runs to completion. Each
// command's output is batched in an `OutputBuffer` and written in one go.
//
// Two commands are handled here rather than by the application:
//
//   Quit    ends the loop.
//   Resize  re-queries the window size and hands it to `App::on_resize`.
//
// Raw mode is entered when the loop starts and left when it ends, whether
// the loop ends cleanly or with an error.

use std::io::{self, Read, Stdin, Stdout, Write};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::input::{Command, InputReader};
use crate::output::OutputBuffer;
use crate::terminal::{self, ModeSwitch, Size, TerminalDriver};

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// The loop calls [`on_start`](App::on_start) once after entering raw mode,
/// then [`on_command`](App::on_command) for every decoded command, and
/// [`on_exit`](App::on_exit) before restoring the terminal. Everything an
/// app wants on screen goes into the provided [`OutputBuffer`]; a write
/// error returned from a callback ends the loop.
pub trait App {
    /// First paint.
    fn on_start(&mut self, out: &mut OutputBuffer) -> io::Result<()>;

    /// Handle one command. Return [`Action::Quit`] to stop.
    fn on_command(&mut self, command: Command, out: &mut OutputBuffer) -> io::Result<Action>;

    /// The terminal has a new size.
    fn on_resize(&mut self, size: Size, out: &mut OutputBuffer) -> io::Result<()>;

    /// Last output before the terminal goes back to normal mode.
    fn on_exit(&mut self, _out: &mut OutputBuffer) -> io::Result<()> {
        Ok(())
    }
}

// ─── Event Loop ──────────────────────────────────────────────────────────────

/// Blocking event loop over an input source, an output sink, and a terminal
/// mode switch.
pub struct EventLoop<R, W, M> {
    input: InputReader<R>,
    output: W,
    mode: M,
    query_size: fn() -> Result<Size>,
    out: OutputBuffer,
}

impl EventLoop<Stdin, Stdout, TerminalDriver> {
    /// Event loop on the process's stdin/stdout and controlling terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes cannot be captured.
    pub fn stdio() -> Result<Self> {
        Ok(Self::new(
            std::io::stdin(),
            std::io::stdout(),
            TerminalDriver::new()?,
            terminal::get_size,
        ))
    }
}

impl<R: Read, W: Write, M: ModeSwitch> EventLoop<R, W, M> {
    pub fn new(input: R, output: W, mode: M, query_size: fn() -> Result<Size>) -> Self {
        Self {
            input: InputReader::new(input),
            output,
            mode,
            query_size,
            out: OutputBuffer::new(),
        }
    }

    /// Current terminal size, as reported by the size query.
    ///
    /// # Errors
    ///
    /// Propagates a failed window-size query.
    pub fn size(&self) -> Result<Size> {
        (self.query_size)()
    }

    /// The output sink.
    pub const fn output(&self) -> &W {
        &self.output
    }

    /// The mode switch.
    pub const fn mode(&self) -> &M {
        &self.mode
    }

    /// Run until [`Command::Quit`], [`Action::Quit`], or end of input.
    ///
    /// Normal mode is restored on every way out once raw mode was entered,
    /// including when a callback, the size query, or an input read fails.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: a failed mode switch, size query,
    /// input read, or output write. An error from the body wins over an
    /// error from restoring normal mode.
    pub fn run(&mut self, app: &mut impl App) -> Result<()> {
        self.mode.enter_raw()?;
        let body = self.run_raw(app);
        let restored = self.mode.restore_normal();
        if let Err(e) = &body {
            warn!("event loop failed: {e}");
        }
        body.and(restored)
    }

    fn run_raw(&mut self, app: &mut impl App) -> Result<()> {
        app.on_start(&mut self.out)?;
        self.flush()?;

        while let Some(command) = self.input.next_command()? {
            let action = match command {
                Command::Quit => Action::Quit,
                Command::Resize => {
                    let size = (self.query_size)()?;
                    info!(cols = size.cols, rows = size.rows, "resize");
                    app.on_resize(size, &mut self.out)?;
                    Action::Continue
                }
                other => app.on_command(other, &mut self.out)?,
            };
            self.flush()?;
            if action == Action::Quit {
                break;
            }
        }

        debug!("leaving event loop");
        app.on_exit(&mut self.out)?;
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush_to(&mut self.output)?;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
