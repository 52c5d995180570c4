//! # Error Handling
//!
//! This module provides the error type shared by every Numbat Core operation.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Key Management Errors                                             │
//! │  │   ├── KeyGenFailed          - Key pair generation failed            │
//! │  │   ├── WrongKeyType          - Key is not an RSA key                 │
//! │  │   └── SerializationFailed   - DER encoding/decoding failed          │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── EncryptionFailed      - AEAD seal / RSA encryption failed     │
//! │  │   ├── DecryptFailed         - Any decryption failure (no detail)    │
//! │  │   ├── KeyDerivationFailed   - Invalid Argon2 parameters             │
//! │  │   └── MessageTooLarge       - Plaintext exceeds the OAEP bound      │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── IoFailed              - File open/read/write failed           │
//! │  │   ├── InvalidFormat         - Wrong label, malformed PEM/base64     │
//! │  │   └── ConfigError           - Unreadable or invalid config file     │
//! │  │                                                                      │
//! │  └── Passphrase Errors                                                 │
//! │      └── PassphraseMismatch    - Confirmation entry did not match      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Decryption Failures
//!
//! `DecryptFailed` deliberately carries no detail. A wrong passphrase, a
//! flipped bit in the envelope, a truncated file and a bad OAEP padding all
//! produce the exact same value, so callers cannot be turned into an oracle.

use thiserror::Error;

/// Result type alias for Numbat Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Numbat Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Key Management Errors (100-199)
    // ========================================================================

    /// Key pair generation failed
    #[error("Failed to generate key pair: {0}")]
    KeyGenFailed(String),

    /// The decoded key is not an RSA key
    #[error("Unexpected key type: {0}")]
    WrongKeyType(String),

    /// Encoding or decoding a key's DER form failed
    #[error("Key serialization failed: {0}")]
    SerializationFailed(String),

    // ========================================================================
    // Crypto Errors (200-299)
    // ========================================================================

    /// Encryption failed for a reason other than the plaintext size
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed")]
    DecryptFailed,

    /// Key derivation parameters were rejected
    #[error("Failed to derive key: {0}")]
    KeyDerivationFailed(String),

    /// Plaintext is larger than the key can encrypt in one block
    #[error("Message too large: {len} bytes (maximum {max} for this key)")]
    MessageTooLarge {
        /// Length of the rejected plaintext
        len: usize,
        /// Largest plaintext the key accepts
        max: usize,
    },

    // ========================================================================
    // Storage Errors (300-399)
    // ========================================================================

    /// File open/read/write failed
    #[error("I/O failed: {0}")]
    IoFailed(String),

    /// Container label or encoding is wrong
    #[error("Invalid key file format: {0}")]
    InvalidFormat(String),

    /// Configuration could not be read or parsed
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    // ========================================================================
    // Passphrase Errors (400-499)
    // ========================================================================

    /// The two passphrase entries differ
    #[error("Passphrases do not match")]
    PassphraseMismatch,
}

impl Error {
    /// Get a stable numeric code for the error
    ///
    /// Error codes are organized by category:
    /// - 100-199: Key management
    /// - 200-299: Crypto
    /// - 300-399: Storage
    /// - 400-499: Passphrase
    pub fn code(&self) -> i32 {
        match self {
            // Key management (100-199)
            Error::KeyGenFailed(_) => 100,
            Error::WrongKeyType(_) => 101,
            Error::SerializationFailed(_) => 102,

            // Crypto (200-299)
            Error::EncryptionFailed(_) => 200,
            Error::DecryptFailed => 201,
            Error::KeyDerivationFailed(_) => 202,
            Error::MessageTooLarge { .. } => 203,

            // Storage (300-399)
            Error::IoFailed(_) => 300,
            Error::InvalidFormat(_) => 301,
            Error::ConfigError(_) => 302,

            // Passphrase (400-499)
            Error::PassphraseMismatch => 400,
        }
    }

    /// Check if this error requires user action
    ///
    /// These are the failures where prompting again (or choosing a shorter
    /// message) can succeed. Retrying is always the caller's decision.
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Error::DecryptFailed | Error::PassphraseMismatch | Error::MessageTooLarge { .. }
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoFailed(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::KeyGenFailed("test".into()).code(), 100);
        assert_eq!(Error::DecryptFailed.code(), 201);
        assert_eq!(Error::MessageTooLarge { len: 191, max: 190 }.code(), 203);
        assert_eq!(Error::IoFailed("test".into()).code(), 300);
        assert_eq!(Error::PassphraseMismatch.code(), 400);
    }

    #[test]
    fn test_decrypt_failed_has_no_detail() {
        assert_eq!(Error::DecryptFailed.to_string(), "Decryption failed");
    }

    #[test]
    fn test_user_action_errors() {
        assert!(Error::PassphraseMismatch.requires_user_action());
        assert!(Error::DecryptFailed.requires_user_action());
        assert!(!Error::IoFailed("disk full".into()).requires_user_action());
        assert!(!Error::WrongKeyType("ed25519".into()).requires_user_action());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: Error = io.into();

        assert_eq!(err.code(), 300);
        assert!(err.to_string().contains("no such file"));
    }
}
