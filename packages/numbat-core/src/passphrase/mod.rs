//! # Passphrase Capture
//!
//! Reads the passphrase that protects a private key, optionally asking for it
//! twice.
//!
//! ## Capture Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PASSPHRASE CAPTURE                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  "Enter passphrase: "   ──► primary      (no echo)                     │
//! │                                                                         │
//! │  require_confirmation?                                                 │
//! │     │                                                                   │
//! │     ├── no  ──► Passphrase(primary)                                    │
//! │     │                                                                   │
//! │     └── yes ──► "Confirm passphrase: " ──► confirmation (no echo)      │
//! │                      │                                                  │
//! │                      ├── equal    ──► zero(confirmation)               │
//! │                      │               Passphrase(primary)               │
//! │                      │                                                  │
//! │                      └── differ   ──► zero(primary), zero(confirmation)│
//! │                                      Err(PassphraseMismatch)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input comes from a [`SecretSource`]. [`TerminalSource`] is the interactive
//! implementation; tests and non-interactive callers provide their own.

mod terminal;

pub use terminal::TerminalSource;

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::memory::{constant_time_eq, zero};
use crate::error::{Error, Result};

/// Prompt for the first (or only) entry
pub const ENTER_PROMPT: &str = "Enter passphrase: ";

/// Prompt for the confirmation entry
pub const CONFIRM_PROMPT: &str = "Confirm passphrase: ";

/// A passphrase held in memory
///
/// The buffer is zeroized when the value is dropped, which happens at the
/// end of whichever call consumes it, on success and on error alike.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Passphrase(Vec<u8>);

impl Passphrase {
    /// Take ownership of raw passphrase bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The passphrase bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the passphrase is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Passphrase {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Zeroizing<Vec<u8>>> for Passphrase {
    fn from(mut bytes: Zeroizing<Vec<u8>>) -> Self {
        // Move the allocation out; the emptied wrapper has nothing to wipe.
        Self(std::mem::take(&mut *bytes))
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

/// Somewhere a secret line can be read from
pub trait SecretSource {
    /// Show `prompt` and read one line of secret input, without the line
    /// terminator
    fn read_secret(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>>;
}

/// Read a passphrase from the terminal
///
/// With `require_confirmation`, the passphrase is read twice and the entries
/// must match.
pub fn capture(require_confirmation: bool) -> Result<Passphrase> {
    capture_from(&mut TerminalSource::stdout(), require_confirmation)
}

/// Read a passphrase from `source`
pub fn capture_from<S: SecretSource + ?Sized>(
    source: &mut S,
    require_confirmation: bool,
) -> Result<Passphrase> {
    let mut primary = source.read_secret(ENTER_PROMPT)?;

    if require_confirmation {
        let mut confirmation = source.read_secret(CONFIRM_PROMPT)?;
        confirm_match(&mut primary, &mut confirmation)?;
    }

    Ok(Passphrase::from(primary))
}

/// Compare a passphrase against its confirmation entry
///
/// The confirmation is always zeroed. On mismatch the primary entry is
/// zeroed too and `PassphraseMismatch` is returned.
pub fn confirm_match(primary: &mut [u8], confirmation: &mut [u8]) -> Result<()> {
    let matched = constant_time_eq(primary, confirmation);
    zero(confirmation);

    if !matched {
        zero(primary);
        return Err(Error::PassphraseMismatch);
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
