//! No-echo passphrase entry on an interactive terminal.
//!
//! The terminal is switched to raw mode for the duration of one line so key
//! presses are delivered to us instead of being echoed. Raw mode is always
//! restored, including when reading fails.

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use zeroize::Zeroizing;

use super::SecretSource;
use crate::error::{Error, Result};

/// Reads secrets from the controlling terminal, writing prompts to `out`
pub struct TerminalSource<W: Write> {
    out: W,
}

impl TerminalSource<io::Stdout> {
    /// Prompt on standard output
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalSource<W> {
    /// Prompt on an arbitrary writer
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> SecretSource for TerminalSource<W> {
    fn read_secret(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let line = {
            let _raw = RawModeGuard::enable()?;
            read_line_without_echo()
        };

        // The user's Enter was swallowed by raw mode.
        writeln!(self.out)?;
        line
    }
}

/// Disables raw mode when dropped
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

fn read_line_without_echo() -> Result<Zeroizing<Vec<u8>>> {
    // Best effort: entries up to 256 bytes stay in one buffer. Longer ones
    // reallocate and the old buffer is freed without being wiped.
    let mut line = Zeroizing::new(String::with_capacity(256));

    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };

        if kind == KeyEventKind::Release {
            continue;
        }

        match code {
            KeyCode::Enter => break,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(Error::IoFailed("passphrase entry interrupted".into()));
            }
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
                if line.is_empty() {
                    return Err(Error::IoFailed("end of input".into()));
                }
            }
            KeyCode::Char(c) => line.push(c),
            KeyCode::Backspace => {
                line.pop();
            }
            _ => {}
        }
    }

    Ok(Zeroizing::new(std::mem::take(&mut *line).into_bytes()))
}
