// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw stdin bytes, read one at a time, into editor commands. The
// terminal sends ordinary keys as single bytes, Ctrl-letters as control
// codes, and arrow keys (plus a few Meta combinations) as escape sequences:
//
//   ESC [ A/B/C/D   arrow up / down / right / left
//   ESC v           page up
//   ESC < / ESC >   beginning / end of buffer
//   ESC g           goto line
//
// # Design
//
// Decoding is a three-state machine (`Init`, `Escape`, `Csi`) with a total
// transition function, [`step`]. Every `(state, byte)` pair produces a next
// state and at most one command. A byte that does not complete a known
// sequence is never dropped: it is re-classified as if it had arrived in
// `Init`. So `ESC x` yields `Char('x')`, and `ESC ESC [ A` still yields `Up`.
//
// There are no timeouts. Each read is a single blocking byte read, and the
// decoder never waits for more than the next byte.

use std::io::{self, Read};

use tracing::trace;

// ─── Commands ───────────────────────────────────────────────────────────────

/// A decoded editor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// A printable character (bytes 32–186, mapped through Latin-1).
    Char(char),
    /// Any other byte. Shown to the user as `symbol (code)`, never inserted.
    Symbol(u8),
    // ── Control ─────────────────────────────────────────────────
    Quit,
    Backspace,
    Return,
    DeleteForward,
    Cancel,
    Resize,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Forward,
    Back,
    LineBegin,
    LineEnd,
    BufferBegin,
    BufferEnd,
    PageUp,
    PageDown,
    GotoLine,
    // ── Prompts ─────────────────────────────────────────────────
    FindForward,
    FindBackward,
    SaveAs,
    LoadAs,
}

/// Escape lead byte.
pub const ESC: u8 = 0x1B;

/// Lowest printable byte (space).
pub const PRINTABLE_MIN: u8 = 32;

/// Highest byte inserted as a character.
pub const PRINTABLE_MAX: u8 = 186;

/// Named control codes. Anything below 0x20 not in this table is a symbol.
const fn control(byte: u8) -> Option<Command> {
    Some(match byte {
        0x01 => Command::LineBegin,     // Ctrl-A
        0x04 => Command::DeleteForward, // Ctrl-D
        0x05 => Command::LineEnd,       // Ctrl-E
        0x07 => Command::Cancel,        // Ctrl-G
        0x0C => Command::Resize,        // Ctrl-L
        0x0D => Command::Return,
        0x0F => Command::LoadAs,       // Ctrl-O
        0x11 => Command::Quit,         // Ctrl-Q
        0x12 => Command::FindBackward, // Ctrl-R
        0x13 => Command::FindForward,  // Ctrl-S
        0x16 => Command::PageDown,     // Ctrl-V
        0x17 => Command::SaveAs,       // Ctrl-W
        0x7F => Command::Backspace,
        _ => return None,
    })
}

/// Classify a byte that arrives outside any escape sequence.
///
/// Does not handle [`ESC`]; that is a state change, not a command.
#[must_use]
pub const fn classify(byte: u8) -> Command {
    if let Some(cmd) = control(byte) {
        return cmd;
    }
    match byte {
        PRINTABLE_MIN..=PRINTABLE_MAX => Command::Char(byte as char),
        _ => Command::Symbol(byte),
    }
}

// ─── State Machine ──────────────────────────────────────────────────────────

/// Where the decoder is within an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Between commands.
    #[default]
    Init,
    /// After `ESC`.
    Escape,
    /// After `ESC [`.
    Csi,
}

/// The transition function: one byte in, next state and at most one
/// command out. Total over all states and bytes.
#[must_use]
pub const fn step(state: DecoderState, byte: u8) -> (DecoderState, Option<Command>) {
    match state {
        DecoderState::Init => {
            if byte == ESC {
                (DecoderState::Escape, None)
            } else {
                (DecoderState::Init, Some(classify(byte)))
            }
        }
        DecoderState::Escape => match byte {
            b'[' => (DecoderState::Csi, None),
            b'v' => (DecoderState::Init, Some(Command::PageUp)),
            b'<' => (DecoderState::Init, Some(Command::BufferBegin)),
            b'>' => (DecoderState::Init, Some(Command::BufferEnd)),
            b'g' => (DecoderState::Init, Some(Command::GotoLine)),
            _ => step(DecoderState::Init, byte),
        },
        DecoderState::Csi => match byte {
            b'A' => (DecoderState::Init, Some(Command::Up)),
            b'B' => (DecoderState::Init, Some(Command::Down)),
            b'C' => (DecoderState::Init, Some(Command::Forward)),
            b'D' => (DecoderState::Init, Some(Command::Back)),
            _ => step(DecoderState::Init, byte),
        },
    }
}

/// Stateful wrapper around [`step`].
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    state: DecoderState,
}

impl Decoder {
    /// Create a decoder in the `Init` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecoderState::Init,
        }
    }

    /// Feed one byte.
    pub fn feed(&mut self, byte: u8) -> Option<Command> {
        let (next, command) = step(self.state, byte);
        trace!(byte, from = ?self.state, to = ?next, ?command, "decoded byte");
        self.state = next;
        command
    }
}

// ─── Reader ─────────────────────────────────────────────────────────────────

/// Pulls bytes from a blocking source and decodes them into commands.
///
/// # Example
///
/// ```
/// use tedit_term::input::{Command, InputReader};
///
/// let mut input = InputReader::new(&b"a\x1b[A"[..]);
/// assert_eq!(input.next_command()?, Some(Command::Char('a')));
/// assert_eq!(input.next_command()?, Some(Command::Up));
/// assert_eq!(input.next_command()?, None);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct InputReader<R> {
    source: R,
    decoder: Decoder,
}

impl<R: Read> InputReader<R> {
    pub const fn new(source: R) -> Self {
        Self {
            source,
            decoder: Decoder::new(),
        }
    }

    /// Block until the next complete command.
    ///
    /// Returns `Ok(None)` at end of input. A sequence cut short by end of
    /// input is discarded.
    ///
    /// # Errors
    ///
    /// Propagates read errors other than `Interrupted`.
    pub fn next_command(&mut self) -> io::Result<Option<Command>> {
        loop {
            let Some(byte) = self.read_byte()? else {
                return Ok(None);
            };
            if let Some(command) = self.decoder.feed(byte) {
                return Ok(Some(command));
            }
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
