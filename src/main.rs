// SPDX-License-Identifier: MIT
//
// tedit: a minimal full-screen terminal text editor.
//
// This is the main binary that wires together the crates:
//
//   tedit-term   → raw mode, input decoding, ANSI output, event loop
//   tedit-editor → line buffer, cursor, viewport, rendering, files
//
// The Editor struct implements tedit-term's App trait. Each keypress flows
// through:
//
//   stdin → decoder → Command → Editor dispatch → buffer/cursor mutation
//         → viewport refresh → render → stdout
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← rows - 1
//   ├──────────────────────────────┤
//   │ status line (INVERSE)        │  ← 1 row
//   └──────────────────────────────┘

mod config;
mod editor;

use std::env;
use std::fs::File;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tedit_term::event_loop::EventLoop;

use crate::config::{Config, Startup, USAGE};
use crate::editor::Editor;

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send tracing output to `path`. The screen belongs to the editor, so
/// nothing is logged unless a file is given.
fn init_logging(path: &Path, filter: &str) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
    Ok(())
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Run one session. The event loop, and with it the terminal driver, is
/// dropped before this returns, so the terminal is back in normal mode
/// by the time the caller reports an error.
fn run(config: &Config) -> tedit_term::Result<()> {
    let mut event_loop = EventLoop::stdio()?;
    let size = event_loop.size()?;
    info!(cols = size.cols, rows = size.rows, file = ?config.file, "starting");

    let mut editor = match &config.file {
        Some(path) => Editor::open(path, size),
        None => Editor::new(size),
    };
    event_loop.run(&mut editor)
}

fn main() -> ExitCode {
    let startup = Config::from_args_and_env(env::args().skip(1), |key| env::var(key).ok());
    let config = match startup {
        Ok(Startup::Edit(config)) => config,
        Ok(Startup::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("tedit: {e}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &config.log_file {
        if let Err(e) = init_logging(path, &config.log_filter) {
            eprintln!("tedit: cannot open log file {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }

    match run(&config) {
        Ok(()) => {
            info!("exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("tedit: {e}");
            ExitCode::FAILURE
        }
    }
}
