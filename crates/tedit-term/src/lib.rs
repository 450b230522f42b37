// SPDX-License-Identifier: MIT
//
// tedit-term: Terminal layer for tedit.
//
// Everything that touches the terminal device lives here: raw mode via
// termios, the window-size query, the byte-at-a-time input decoder, ANSI
// escape generation, and the blocking event loop that ties them together.
//
// No TUI framework sits underneath. Control sequences are written by hand
// through `ansi`, and termios is driven directly through libc.

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod style;
pub mod terminal;

pub use error::{Error, Result};
