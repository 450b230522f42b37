// SPDX-License-Identifier: MIT
//
// Error type for terminal operations.
//
// Everything in here is fatal to the editor: without a controllable
// terminal there is nothing left to edit with. The binary reports these
// after the terminal has been restored and exits non-zero.

use std::io;

use thiserror::Error;

/// Terminal layer error.
#[derive(Error, Debug)]
pub enum Error {
    /// `tcgetattr` or `tcsetattr` returned non-zero.
    #[error("{call} failed: {source}")]
    TermAttr {
        /// Name of the failing libc call.
        call: &'static str,
        /// OS error captured right after the call.
        #[source]
        source: io::Error,
    },

    /// The window-size query failed or reported a zero extent.
    #[error("cannot determine terminal size: {0}")]
    WindowSize(#[source] io::Error),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for terminal operations.
pub type Result<T> = std::result::Result<T, Error>;
