//! Loading and saving buffers.
//!
//! Files are UTF-8 text with `\n` (or `\r\n`) line endings. A trailing
//! newline shows up as a final empty line, so save-then-load reproduces the
//! exact line sequence and load-then-save reproduces the file (modulo
//! `\r\n`, which is written back as `\n`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// A failed load or save. The editor recovers from both.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("cannot open {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Whether the file simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        let (Self::Load { source, .. } | Self::Save { source, .. }) = self;
        source.kind() == io::ErrorKind::NotFound
    }
}

/// Split text into buffer lines.
///
/// Never returns an empty vector.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
    if text.ends_with('\n') || lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Read `path` into lines.
///
/// # Errors
///
/// [`FileError::Load`] if the file cannot be read or is not UTF-8.
pub fn load(path: &Path) -> Result<Vec<String>, FileError> {
    let text = fs::read_to_string(path).map_err(|source| FileError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let lines = split_lines(&text);
    info!(path = %path.display(), lines = lines.len(), "loaded");
    Ok(lines)
}

/// Write `lines` to `path`, joined with `\n`, without a trailing newline.
///
/// # Errors
///
/// [`FileError::Save`] if the file cannot be written.
pub fn save(path: &Path, lines: &[String]) -> Result<(), FileError> {
    fs::write(path, lines.join("\n")).map_err(|source| FileError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), lines = lines.len(), "saved");
    Ok(())
}
