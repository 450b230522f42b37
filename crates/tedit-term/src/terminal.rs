// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr) and ioctl (TIOCGWINSZ). These are the standard POSIX
// interfaces for terminal control; there is no safe alternative. Each
// unsafe block is minimal.
#![allow(unsafe_code)]
//
// The terminal's mode is described by `ModeFlags`, a plain value with one
// named boolean per capability the editor toggles. The OS bitmask only
// appears at the boundary, when a `TermState` is turned back into a
// `libc::termios` and handed to tcsetattr.
//
// `TerminalDriver` captures the original attributes once, at construction,
// and derives the raw variant from them right away. It owns both. Dropping
// the driver while raw restores the original attributes, so an early `?`
// return or an unwinding panic still hands the user back a working shell.
//
// Drop runs only after the panic hook has printed, though. While a driver
// is raw it also leaves its normal attributes in a global slot, and a panic
// hook installed on first entry puts them back (and clears the screen)
// before the previous hook prints the message.

use std::fmt;
use std::io;
#[cfg(unix)]
use std::sync::{Mutex, Once, PoisonError};

use tracing::debug;

use crate::error::{Error, Result};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

/// Query the current terminal size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// # Errors
///
/// Returns [`Error::WindowSize`] if the ioctl fails or reports a zero
/// extent (stdout is not a terminal).
#[cfg(unix)]
pub fn get_size() -> Result<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result != 0 {
        return Err(Error::WindowSize(io::Error::last_os_error()));
    }
    if ws.ws_col == 0 || ws.ws_row == 0 {
        return Err(Error::WindowSize(io::Error::other(
            "terminal reported a zero-sized window",
        )));
    }

    let size = Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    };
    debug!(cols = size.cols, rows = size.rows, "queried window size");
    Ok(size)
}

#[cfg(not(unix))]
pub fn get_size() -> Result<Size> {
    Err(Error::WindowSize(io::Error::new(
        io::ErrorKind::Unsupported,
        "window size query needs a unix terminal",
    )))
}

// ─── Mode Flags ─────────────────────────────────────────────────────────────

/// The terminal capabilities that differ between normal and raw mode.
///
/// Each field corresponds to one termios bit:
///
/// | Field               | Flag     | Field of termios |
/// |---------------------|----------|------------------|
/// | `echo`              | `ECHO`   | `c_lflag`        |
/// | `canonical`         | `ICANON` | `c_lflag`        |
/// | `signals`           | `ISIG`   | `c_lflag`        |
/// | `extended_input`    | `IEXTEN` | `c_lflag`        |
/// | `cr_nl_translation` | `ICRNL`  | `c_iflag`        |
/// | `flow_control`      | `IXON`   | `c_iflag`        |
/// | `output_processing` | `OPOST`  | `c_oflag`        |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)] // One bool per termios capability.
pub struct ModeFlags {
    pub echo: bool,
    pub canonical: bool,
    pub signals: bool,
    pub extended_input: bool,
    pub cr_nl_translation: bool,
    pub flow_control: bool,
    pub output_processing: bool,
}

impl ModeFlags {
    /// Every capability on: a cooked, line-buffered terminal.
    pub const NORMAL: Self = Self {
        echo: true,
        canonical: true,
        signals: true,
        extended_input: true,
        cr_nl_translation: true,
        flow_control: true,
        output_processing: true,
    };

    /// Derive the raw variant: echo, canonical mode, signal generation,
    /// extended input, CR/NL translation, flow control and output
    /// post-processing all cleared.
    #[must_use]
    pub const fn raw(self) -> Self {
        Self {
            echo: false,
            canonical: false,
            signals: false,
            extended_input: false,
            cr_nl_translation: false,
            flow_control: false,
            output_processing: false,
        }
    }

    /// Derive the normal variant by switching every raw-toggled flag back on.
    #[must_use]
    pub const fn normal(self) -> Self {
        Self::NORMAL
    }

    /// A terminal without output post-processing is taken to be raw already,
    /// e.g. left behind by a crashed program.
    #[must_use]
    pub const fn is_raw(self) -> bool {
        !self.output_processing
    }
}

impl fmt::Display for ModeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool| if on { '+' } else { '-' };
        write!(
            f,
            "{}echo {}icanon {}isig {}iexten {}icrnl {}ixon {}opost",
            flag(self.echo),
            flag(self.canonical),
            flag(self.signals),
            flag(self.extended_input),
            flag(self.cr_nl_translation),
            flag(self.flow_control),
            flag(self.output_processing),
        )
    }
}

#[cfg(unix)]
impl ModeFlags {
    /// Read the flags out of an OS attribute record.
    #[must_use]
    pub fn from_termios(t: &libc::termios) -> Self {
        Self {
            echo: t.c_lflag & libc::ECHO != 0,
            canonical: t.c_lflag & libc::ICANON != 0,
            signals: t.c_lflag & libc::ISIG != 0,
            extended_input: t.c_lflag & libc::IEXTEN != 0,
            cr_nl_translation: t.c_iflag & libc::ICRNL != 0,
            flow_control: t.c_iflag & libc::IXON != 0,
            output_processing: t.c_oflag & libc::OPOST != 0,
        }
    }

    /// Write the flags into an OS attribute record, leaving every other bit
    /// untouched.
    pub fn apply_to(self, t: &mut libc::termios) {
        set_bit(&mut t.c_lflag, libc::ECHO, self.echo);
        set_bit(&mut t.c_lflag, libc::ICANON, self.canonical);
        set_bit(&mut t.c_lflag, libc::ISIG, self.signals);
        set_bit(&mut t.c_lflag, libc::IEXTEN, self.extended_input);
        set_bit(&mut t.c_iflag, libc::ICRNL, self.cr_nl_translation);
        set_bit(&mut t.c_iflag, libc::IXON, self.flow_control);
        set_bit(&mut t.c_oflag, libc::OPOST, self.output_processing);
    }
}

#[cfg(unix)]
fn set_bit(field: &mut libc::tcflag_t, bit: libc::tcflag_t, on: bool) {
    if on {
        *field |= bit;
    } else {
        *field &= !bit;
    }
}

// ─── Term State ─────────────────────────────────────────────────────────────

/// A complete terminal attribute set: the editor-relevant flags plus the
/// untouched remainder of the record they were captured from.
#[derive(Clone, Copy)]
pub struct TermState {
    flags: ModeFlags,
    #[cfg(unix)]
    base: libc::termios,
}

impl TermState {
    /// The editor-relevant flags of this state.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> ModeFlags {
        self.flags
    }

    /// Same underlying record, different flags.
    #[must_use]
    pub fn with_flags(self, flags: ModeFlags) -> Self {
        Self { flags, ..self }
    }

    /// Read the current attributes of `fd`.
    #[cfg(unix)]
    fn capture(fd: libc::c_int) -> Result<Self> {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(Error::TermAttr {
                call: "tcgetattr",
                source: io::Error::last_os_error(),
            });
        }
        Ok(Self {
            flags: ModeFlags::from_termios(&termios),
            base: termios,
        })
    }

    /// Build the OS record. Raw states also get `VMIN = 1, VTIME = 0` so
    /// every read() blocks until exactly one byte is available.
    #[cfg(unix)]
    fn to_termios(self) -> libc::termios {
        let mut termios = self.base;
        self.flags.apply_to(&mut termios);
        if self.flags.is_raw() {
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
        }
        termios
    }

    #[cfg(unix)]
    fn apply(self, fd: libc::c_int) -> Result<()> {
        let termios = self.to_termios();
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(Error::TermAttr {
                call: "tcsetattr",
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for TermState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermState")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

// ─── Panic Recovery ─────────────────────────────────────────────────────────

/// Descriptor and normal attributes of the driver that is currently raw.
#[cfg(unix)]
type SavedAttrs = Option<(libc::c_int, libc::termios)>;

#[cfg(unix)]
static PANIC_RESTORE: Mutex<SavedAttrs> = Mutex::new(None);

#[cfg(unix)]
static PANIC_HOOK: Once = Once::new();

/// SGR reset, erase display, cursor home.
#[cfg(unix)]
const PANIC_SCREEN_RESET: &[u8] = b"\x1b[0m\x1b[2J\x1b[H";

#[cfg(unix)]
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if restore_saved(&PANIC_RESTORE) {
                // Straight to fd 1: the panic may have happened while the
                // stdout lock was held.
                unsafe {
                    libc::write(
                        libc::STDOUT_FILENO,
                        PANIC_SCREEN_RESET.as_ptr().cast::<libc::c_void>(),
                        PANIC_SCREEN_RESET.len(),
                    );
                }
            }
            previous(info);
        }));
    });
}

/// Reinstall and empty the attributes saved in `slot`. Best effort.
///
/// Returns whether anything was saved.
#[cfg(unix)]
fn restore_saved(slot: &Mutex<SavedAttrs>) -> bool {
    let saved = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    let Some((fd, termios)) = saved else {
        return false;
    };
    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, &raw const termios);
    }
    true
}

// ─── Mode Switching ─────────────────────────────────────────────────────────

/// Something that can put the terminal into raw mode and back.
///
/// [`TerminalDriver`] is the real implementation; the event loop is generic
/// over this so it can run against a fake in tests.
pub trait ModeSwitch {
    /// Install raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes cannot be set.
    fn enter_raw(&mut self) -> Result<()>;

    /// Reinstall the original mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes cannot be set.
    fn restore_normal(&mut self) -> Result<()>;
}

// ─── Terminal Driver ────────────────────────────────────────────────────────

/// Owner of the terminal's normal and raw attribute sets.
///
/// # Example
///
/// ```no_run
/// use tedit_term::terminal::{ModeSwitch, TerminalDriver};
///
/// let mut driver = TerminalDriver::new()?;
/// driver.enter_raw()?;
/// // ... read keys one byte at a time ...
/// driver.restore_normal()?; // Also happens on drop.
/// # Ok::<(), tedit_term::Error>(())
/// ```
pub struct TerminalDriver {
    #[cfg(unix)]
    fd: libc::c_int,
    normal: TermState,
    raw: TermState,
    in_raw: bool,
}

impl TerminalDriver {
    /// Capture stdin's current attributes and derive the raw variant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TermAttr`] if `tcgetattr` fails (stdin is not a
    /// terminal).
    #[cfg(unix)]
    pub fn new() -> Result<Self> {
        let fd = libc::STDIN_FILENO;
        let captured = TermState::capture(fd)?;
        let already_raw = captured.flags().is_raw();

        let (normal, raw) = if already_raw {
            (captured.with_flags(captured.flags().normal()), captured)
        } else {
            (captured, captured.with_flags(captured.flags().raw()))
        };

        debug!(
            captured = %captured.flags(),
            raw = %raw.flags(),
            "captured terminal state"
        );

        Ok(Self {
            fd,
            normal,
            raw,
            in_raw: already_raw,
        })
    }

    #[cfg(not(unix))]
    pub fn new() -> Result<Self> {
        let normal = TermState {
            flags: ModeFlags::NORMAL,
        };
        Ok(Self {
            normal,
            raw: normal.with_flags(ModeFlags::NORMAL.raw()),
            in_raw: false,
        })
    }

    /// The state restored on exit.
    #[inline]
    #[must_use]
    pub const fn normal_state(&self) -> &TermState {
        &self.normal
    }

    /// The state installed by [`enter_raw`](ModeSwitch::enter_raw).
    #[inline]
    #[must_use]
    pub const fn raw_state(&self) -> &TermState {
        &self.raw
    }

    /// Whether the raw state is currently installed.
    #[inline]
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.in_raw
    }

    #[cfg(unix)]
    fn install(&self, state: TermState) -> Result<()> {
        state.apply(self.fd)
    }

    #[cfg(not(unix))]
    #[allow(clippy::unused_self)]
    fn install(&self, _state: TermState) -> Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn arm_panic_restore(&self) {
        install_panic_hook();
        let saved = Some((self.fd, self.normal.to_termios()));
        *PANIC_RESTORE.lock().unwrap_or_else(PoisonError::into_inner) = saved;
    }

    #[cfg(unix)]
    #[allow(clippy::unused_self)]
    fn disarm_panic_restore(&self) {
        PANIC_RESTORE
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    #[cfg(not(unix))]
    #[allow(clippy::unused_self)]
    const fn arm_panic_restore(&self) {}

    #[cfg(not(unix))]
    #[allow(clippy::unused_self)]
    const fn disarm_panic_restore(&self) {}
}

impl ModeSwitch for TerminalDriver {
    /// Applying the raw state twice is harmless, so this always applies.
    fn enter_raw(&mut self) -> Result<()> {
        self.install(self.raw)?;
        self.in_raw = true;
        self.arm_panic_restore();
        debug!("terminal is in raw mode");
        Ok(())
    }

    fn restore_normal(&mut self) -> Result<()> {
        if !self.in_raw {
            return Ok(());
        }
        self.install(self.normal)?;
        self.in_raw = false;
        self.disarm_panic_restore();
        debug!("terminal is in normal mode");
        Ok(())
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        if self.in_raw {
            let _ = self.restore_normal();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Size ──────────────────────────────────────────────────────────

    #[test]
    fn size_new() {
        let s = Size::new(80, 24);
        assert_eq!(s.cols, 80);
        assert_eq!(s.rows, 24);
    }

    #[test]
    fn get_size_does_not_panic() {
        // Under a test harness stdout is usually a pipe, so this is an
        // error, but it must be a clean one.
        let _ = get_size();
    }

    // ── ModeFlags ─────────────────────────────────────────────────────

    #[test]
    fn raw_clears_every_capability() {
        let raw = ModeFlags::NORMAL.raw();
        assert_eq!(
            raw,
            ModeFlags {
                echo: false,
                canonical: false,
                signals: false,
                extended_input: false,
                cr_nl_translation: false,
                flow_control: false,
                output_processing: false,
            }
        );
        assert!(raw.is_raw());
    }

    #[test]
    fn normal_restores_every_capability() {
        let back = ModeFlags::NORMAL.raw().normal();
        assert_eq!(back, ModeFlags::NORMAL);
        assert!(!back.is_raw());
    }

    #[test]
    fn raw_is_idempotent() {
        let once = ModeFlags::NORMAL.raw();
        assert_eq!(once.raw(), once);
    }

    #[test]
    fn raw_detection_uses_output_processing() {
        let flags = ModeFlags {
            output_processing: false,
            ..ModeFlags::NORMAL
        };
        assert!(flags.is_raw());
    }

    #[test]
    fn display_lists_flags() {
        assert_eq!(
            ModeFlags::NORMAL.raw().to_string(),
            "-echo -icanon -isig -iexten -icrnl -ixon -opost"
        );
        assert!(ModeFlags::NORMAL.to_string().starts_with("+echo +icanon"));
    }

    // ── Bitmask boundary ──────────────────────────────────────────────

    #[cfg(unix)]
    fn cooked_termios() -> libc::termios {
        let mut t: libc::termios = unsafe { std::mem::zeroed() };
        t.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN | libc::ECHOE;
        t.c_iflag = libc::ICRNL | libc::IXON | libc::BRKINT;
        t.c_oflag = libc::OPOST | libc::ONLCR;
        t.c_cflag = libc::CS8;
        t
    }

    #[cfg(unix)]
    #[test]
    fn from_termios_reads_flags() {
        assert_eq!(ModeFlags::from_termios(&cooked_termios()), ModeFlags::NORMAL);
    }

    #[cfg(unix)]
    #[test]
    fn apply_to_clears_only_raw_bits() {
        let mut t = cooked_termios();
        ModeFlags::NORMAL.raw().apply_to(&mut t);

        assert_eq!(t.c_lflag, libc::ECHOE);
        assert_eq!(t.c_iflag, libc::BRKINT);
        assert_eq!(t.c_oflag, libc::ONLCR);
        assert_eq!(t.c_cflag, libc::CS8);
    }

    #[cfg(unix)]
    #[test]
    fn raw_state_sets_blocking_single_byte_reads() {
        let state = TermState {
            flags: ModeFlags::NORMAL,
            base: cooked_termios(),
        };
        let raw = state.with_flags(state.flags().raw()).to_termios();
        assert_eq!(raw.c_cc[libc::VMIN], 1);
        assert_eq!(raw.c_cc[libc::VTIME], 0);
        assert_eq!(ModeFlags::from_termios(&raw), ModeFlags::NORMAL.raw());
    }

    #[cfg(unix)]
    #[test]
    fn normal_state_round_trips_record() {
        let base = cooked_termios();
        let state = TermState {
            flags: ModeFlags::from_termios(&base),
            base,
        };
        let t = state.to_termios();
        assert_eq!(t.c_lflag, base.c_lflag);
        assert_eq!(t.c_iflag, base.c_iflag);
        assert_eq!(t.c_oflag, base.c_oflag);
    }

    #[test]
    fn term_state_debug_shows_flags() {
        let state = TermState {
            flags: ModeFlags::NORMAL,
            #[cfg(unix)]
            base: unsafe { std::mem::zeroed() },
        };
        let debug = format!("{state:?}");
        assert!(debug.contains("TermState"));
        assert!(debug.contains("echo: true"));
    }

    // ── Panic recovery ────────────────────────────────────────────────

    #[cfg(unix)]
    #[test]
    fn restore_saved_empties_the_slot() {
        let termios: libc::termios = unsafe { std::mem::zeroed() };
        // fd -1: tcsetattr fails with EBADF, which is ignored.
        let slot = Mutex::new(Some((-1, termios)));
        assert!(restore_saved(&slot));
        assert!(slot.lock().unwrap().is_none());
        assert!(!restore_saved(&slot));
    }

    // ── Driver ────────────────────────────────────────────────────────

    #[test]
    fn driver_cycle_when_stdin_is_a_tty() {
        // Only meaningful when tests run attached to a terminal.
        let Ok(mut driver) = TerminalDriver::new() else {
            return;
        };
        driver.enter_raw().unwrap();
        assert!(driver.is_raw());
        assert!(PANIC_RESTORE.lock().unwrap().is_some());
        driver.restore_normal().unwrap();
        assert!(!driver.is_raw());
        assert!(PANIC_RESTORE.lock().unwrap().is_none());
        driver.restore_normal().unwrap();
        assert!(!driver.raw_state().flags().echo);
        assert!(driver.normal_state().flags().output_processing);
    }
}
