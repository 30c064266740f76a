// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, alternate screen, key reads, RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, sigaction, and raw fd reads and
// writes. These are the standard POSIX interfaces for terminal control —
// there is no safe alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. It enters raw mode via termios
// with a 100ms read timeout (`VMIN=0, VTIME=1`), switches to the alternate
// screen, applies the configured default colors, and guarantees cleanup on
// drop — even if the editor panics mid-frame.
//
// The read timeout is load-bearing: SIGWINCH only sets an atomic flag, and
// the timeout bounds how long a blocked `read_key` can go without noticing
// it. The decode/mutate path never reenters the renderer from a signal.
//
// The panic hook bypasses Rust's stdout lock entirely, writing a pre-built
// restore sequence directly to fd 1. This prevents deadlock if the panic
// happened while the lock was held, and leaves the user's shell readable so
// the panic message actually prints.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use crate::ansi::{self, Rgb};
use crate::key::{self, Key};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails; the
/// caller falls back to a cursor-position report in that case.
#[cfg(unix)]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler.
///
/// The handler only stores to this atomic — one of the few operations that
/// is async-signal-safe. The flag is consumed at the top of the main loop,
/// never inside the decode/mutate path.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── Panic-safe terminal restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup — behind a [`Mutex`], not `static mut` —
/// lets the hook restore raw mode without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Complete terminal restore sequence for emergency use.
///
/// Concatenation of: reset SGR attributes, default foreground/background,
/// OSC default-color resets, show cursor, exit alternate screen. Alternate
/// screen exit is last so the restored shell content appears clean.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[0m\
    \x1b[39m\x1b[49m\
    \x1b]110\x07\x1b]111\x07\
    \x1b[?25h\
    \x1b[?1049l";

/// Panic hook guard — the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor,
/// bypassing Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held (e.g., mid-frame flush).
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// Call [`enter`](Self::enter) to switch to editing mode (raw mode,
/// alternate screen, configured default colors). The terminal is restored
/// when the handle is dropped — even on panic.
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// Current terminal size (cached, refresh with [`refresh_size`](Self::refresh_size)).
    size: Size,

    /// Whether we're in raw + alternate-screen mode.
    active: bool,
}

impl Terminal {
    /// Create a terminal handle and query the current size.
    ///
    /// Does **not** enter raw mode — call [`enter`](Self::enter) for that.
    /// Falls back to 80×24 if the size cannot be determined (e.g., in tests
    /// or piped environments).
    ///
    /// # Errors
    ///
    /// Currently infallible; returns `Result` so callers treat terminal
    /// setup as fallible end to end.
    pub fn new() -> io::Result<Self> {
        let size = ioctl_size().unwrap_or(Size { cols: 80, rows: 24 });

        Ok(Self {
            #[cfg(unix)]
            original_termios: None,
            size,
            active: false,
        })
    }

    /// Current terminal size (columns, rows).
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Whether we're currently in raw editing mode.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Consume the pending resize flag, if any.
    ///
    /// Returns `true` at most once per delivered SIGWINCH. The caller is
    /// expected to follow up with [`refresh_size`](Self::refresh_size).
    pub fn take_resize() -> bool {
        SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed)
    }

    /// Re-query the terminal size from the OS.
    ///
    /// Falls back to a cursor-position report when the ioctl fails: drive
    /// the cursor to the bottom-right corner, then ask where it landed.
    pub fn refresh_size(&mut self) -> io::Result<Size> {
        if let Some(s) = ioctl_size() {
            self.size = s;
        } else if self.active {
            if let Some(s) = self.size_from_cursor_report()? {
                self.size = s;
            }
        }
        Ok(self.size)
    }

    /// Enter raw editing mode.
    ///
    /// Enables raw mode (termios), switches to the alternate screen, sets
    /// the configured default colors, and clears the screen. Installs the
    /// panic hook and the SIGWINCH handler on first use. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or terminal output fails — a fatal
    /// condition for the editor.
    pub fn enter(&mut self, fg: Rgb, bg: Rgb) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        install_sigwinch_handler();
        self.enable_raw_mode()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::enter_alt_screen(&mut lock)?;
        ansi::set_default_colors(&mut lock, fg, bg)?;
        ansi::clear_screen(&mut lock)?;
        ansi::cursor_to(&mut lock, 0, 0)?;
        lock.flush()?;

        self.active = true;
        self.refresh_size()?;
        Ok(())
    }

    /// Leave raw editing mode and restore the terminal.
    ///
    /// Resets colors and attributes, shows the cursor, exits the alternate
    /// screen, and restores the original termios. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or the termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::reset(&mut lock)?;
        ansi::reset_default_colors(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        ansi::exit_alt_screen(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    // ── Key reads ───────────────────────────────────────────────────

    /// Block until one logical key is available and decode it.
    ///
    /// A pending resize flag short-circuits the wait and yields
    /// [`Key::Resize`] so the caller can re-query the window size before
    /// the next frame. ESC starts the escape-sequence grammar in
    /// [`key::decode_escape`]; a sequence the grammar doesn't know (or one
    /// cut short by the read timeout) degrades to a bare Escape. UTF-8
    /// lead bytes are completed into a single `Char`.
    ///
    /// # Errors
    ///
    /// Returns an error only for a failed `read(2)` — fatal for the editor.
    pub fn read_key(&mut self) -> io::Result<Key> {
        loop {
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                return Ok(Key::Resize);
            }

            let Some(byte) = read_byte()? else {
                continue; // Read timeout — loop back to check the flag.
            };

            if byte == 0x1B {
                return Ok(self.read_escape()?);
            }
            if byte < 0x80 {
                return Ok(key::decode_byte(byte));
            }
            if let Some(want) = key::utf8_continuation_len(byte) {
                if let Some(ch) = read_utf8_tail(byte, want)? {
                    return Ok(Key::Char(ch));
                }
            }
            // Stray continuation byte or malformed sequence — drop it.
        }
    }

    /// Read and decode the remainder of an escape sequence.
    ///
    /// At most three bytes follow the ESC in the grammar we accept. Any
    /// read timeout mid-sequence means the ESC stood alone.
    fn read_escape(&mut self) -> io::Result<Key> {
        let mut seq = [0u8; 3];

        let Some(b0) = read_byte()? else {
            return Ok(Key::Escape);
        };
        seq[0] = b0;
        let Some(b1) = read_byte()? else {
            return Ok(Key::Escape);
        };
        seq[1] = b1;

        if b0 == b'[' && b1.is_ascii_digit() {
            let Some(b2) = read_byte()? else {
                return Ok(Key::Escape);
            };
            seq[2] = b2;
            return Ok(key::decode_escape(&seq));
        }

        Ok(key::decode_escape(&seq[..2]))
    }

    /// Window-size fallback: park the cursor at the bottom-right corner and
    /// parse the cursor-position report.
    fn size_from_cursor_report(&mut self) -> io::Result<Option<Size>> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(b"\x1b[999C\x1b[999B\x1b[6n")?;
        lock.flush()?;
        drop(lock);

        let mut buf = Vec::with_capacity(16);
        loop {
            let Some(b) = read_byte()? else {
                break; // Timeout — no report coming.
            };
            buf.push(b);
            if b == b'R' || buf.len() >= 16 {
                break;
            }
        }

        Ok(key::parse_cursor_report(&buf).map(|(rows, cols)| Size { cols, rows }))
    }

    // ── Raw mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            // Save original for restore, plus the panic-hook backup.
            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most 100ms with
            // nothing, which is what keeps resize-flag polling responsive.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            // Clear the global backup — we've restored successfully.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Raw byte reads ─────────────────────────────────────────────────────────

/// Read one byte from stdin, honoring the raw-mode `VTIME` timeout.
///
/// `Ok(None)` means the timeout expired with no input. An `EINTR` (signal
/// during the read) is treated as a timeout so the resize flag gets seen.
#[cfg(unix)]
fn read_byte() -> io::Result<Option<u8>> {
    let mut b: u8 = 0;
    let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut b).cast::<libc::c_void>(), 1) };
    match n {
        1 => Ok(Some(b)),
        0 => Ok(None),
        _ => {
            let err = io::Error::last_os_error();
            if matches!(err.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) {
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

#[cfg(not(unix))]
fn read_byte() -> io::Result<Option<u8>> {
    use std::io::Read;
    let mut buf = [0u8; 1];
    match io::stdin().read(&mut buf)? {
        0 => Ok(None),
        _ => Ok(Some(buf[0])),
    }
}

/// Complete a UTF-8 sequence whose lead byte was already consumed.
///
/// Returns `None` if the tail times out or decodes to invalid UTF-8;
/// the caller drops the bytes and waits for the next key.
fn read_utf8_tail(lead: u8, want: usize) -> io::Result<Option<char>> {
    let mut bytes = vec![lead];
    for _ in 0..want {
        let Some(b) = read_byte()? else {
            return Ok(None);
        };
        bytes.push(b);
    }
    Ok(std::str::from_utf8(&bytes)
        .ok()
        .and_then(|s| s.chars().next()))
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Terminal queries ─────────────────────────────────────────────

    #[test]
    fn ioctl_size_does_not_panic() {
        let _ = ioctl_size();
    }

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    // ── Emergency restore sequence ──────────────────────────────────

    #[test]
    fn emergency_restore_is_valid_utf8() {
        std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
    }

    #[test]
    fn emergency_restore_exits_alt_screen_last() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.ends_with("\x1b[?1049l"));
    }

    #[test]
    fn emergency_restore_contains_all_sequences() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.contains("\x1b[0m"), "must reset SGR attributes");
        assert!(s.contains("\x1b[39m"), "must reset foreground");
        assert!(s.contains("\x1b[49m"), "must reset background");
        assert!(s.contains("\x1b]110\x07"), "must reset OSC foreground");
        assert!(s.contains("\x1b]111\x07"), "must reset OSC background");
        assert!(s.contains("\x1b[?25h"), "must show cursor");
    }

    // ── Terminal struct ─────────────────────────────────────────────

    #[test]
    fn terminal_new_succeeds() {
        let term = Terminal::new().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_has_reasonable_default_size() {
        let term = Terminal::new().unwrap();
        let s = term.size();
        assert!(s.cols > 0);
        assert!(s.rows > 0);
    }

    #[test]
    fn terminal_leave_without_enter() {
        let mut term = Terminal::new().unwrap();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_drop_without_enter() {
        let term = Terminal::new().unwrap();
        drop(term);
    }

    // ── Resize flag ─────────────────────────────────────────────────

    #[test]
    fn take_resize_consumes_flag() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        assert!(Terminal::take_resize());
        assert!(!Terminal::take_resize());
    }
}
