//! Loading indicator
//!
//! Shown while the tutor is grading or answering. Animates on the current
//! line with `\r` + ANSI line clearing, driven by a tokio task, and shows
//! elapsed time.
//!
//! Suppressed when animations are off, stdout is not a terminal, `TERM` is
//! dumb or unset.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::style::is_ascii_mode;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_FRAMES: &[&str] = &["|", "/", "-", "\\"];

static ANIMATIONS: AtomicBool = AtomicBool::new(true);

/// Turn the spinner on or off for the whole process.
pub fn set_animations(enabled: bool) {
    ANIMATIONS.store(enabled, Ordering::Relaxed);
}

pub fn animations_enabled() -> bool {
    ANIMATIONS.load(Ordering::Relaxed)
}

/// Whether the terminal understands ANSI escape sequences.
///
/// This does NOT check `NO_COLOR`; use `supports_color()` for that.
pub fn supports_ansi() -> bool {
    if !io::stdout().is_terminal() {
        return false;
    }
    match std::env::var("TERM") {
        Ok(term) => !term.is_empty() && term != "dumb",
        Err(_) => false,
    }
}

/// Colour is allowed unless `NO_COLOR` is set or ANSI is unsupported.
pub fn supports_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    supports_ansi()
}

fn live() -> bool {
    animations_enabled() && supports_ansi()
}

pub struct TerminalSpinner {
    stop_signal: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
    start_time: Instant,
}

impl TerminalSpinner {
    /// Start a spinner with the given message. Must run inside a tokio
    /// runtime when the spinner is live.
    pub fn start(message: &str) -> Self {
        if !live() {
            return Self::idle();
        }

        let stop_signal = Arc::new(AtomicBool::new(false));
        let msg = message.to_string();
        let stop = stop_signal.clone();
        let start = Instant::now();
        let frames = if is_ascii_mode() { ASCII_FRAMES } else { FRAMES };

        let handle = tokio::spawn(async move {
            let mut tick: usize = 0;
            while !stop.load(Ordering::Relaxed) {
                let frame = frames[tick % frames.len()];
                print!(
                    "\r\x1b[2K  {} {} ({:.1}s)",
                    frame,
                    msg,
                    start.elapsed().as_secs_f64()
                );
                io::stdout().flush().ok();
                tick += 1;
                tokio::time::sleep(tokio::time::Duration::from_millis(80)).await;
            }
        });

        Self {
            stop_signal,
            handle: Some(handle),
            start_time: start,
        }
    }

    /// A spinner that never draws.
    fn idle() -> Self {
        Self {
            stop_signal: Arc::new(AtomicBool::new(true)),
            handle: None,
            start_time: Instant::now(),
        }
    }

    pub fn stop_success(self, message: &str) {
        let icon = if supports_color() {
            "\x1b[32m\u{2714}\x1b[0m"
        } else {
            "\u{2714}"
        };
        self.stop_with_icon(icon, message);
    }

    pub fn stop_error(self, message: &str) {
        let icon = if supports_color() {
            "\x1b[31m\u{2715}\x1b[0m"
        } else {
            "\u{2715}"
        };
        self.stop_with_icon(icon, message);
    }

    fn stop_with_icon(mut self, icon: &str, message: &str) {
        self.stop_signal.store(true, Ordering::Relaxed);
        let was_live = self.handle.is_some();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        if was_live {
            print!("\r\x1b[2K");
            println!(
                "  {} {} ({:.1}s)",
                icon,
                message,
                self.elapsed().as_secs_f64()
            );
            io::stdout().flush().ok();
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Drop for TerminalSpinner {
    fn drop(&mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            print!("\r\x1b[2K");
            io::stdout().flush().ok();
        }
    }
}
