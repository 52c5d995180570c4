//! # Numbat Core
//!
//! Passphrase-protected RSA key management and public-key message
//! encryption for the Numbat chat client.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         NUMBAT CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐   │
//! │  │ Passphrase  │  │   Storage   │  │   Config    │  │    Error     │   │
//! │  │             │  │             │  │             │  │              │   │
//! │  │ - No echo   │  │ - KeyStore  │  │ - Key size  │  │ - One enum   │   │
//! │  │ - Confirm   │  │ - PEM files │  │ - KDF cost  │  │ - Codes      │   │
//! │  │ - Zeroized  │  │ - 0600      │  │ - TOML      │  │              │   │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘  └──────────────┘   │
//! │         │                │                │                             │
//! │         └────────────────┼────────────────┘                             │
//! │                          ▼                                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                          Crypto                                 │   │
//! │  │                                                                 │   │
//! │  │  RSA key pairs · Argon2id KDF · AES-256-GCM envelope · OAEP    │   │
//! │  │  zero() · constant_time_eq()                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error type for the entire library
//! - [`crypto`] - Key pairs, passphrase KDF, envelope AEAD, RSA-OAEP
//! - [`passphrase`] - Passphrase capture without echo
//! - [`storage`] - Encrypted private key and public key files
//! - [`config`] - Key store settings
//!
//! ## Example
//!
//! ```no_run
//! use numbat_core::{decrypt, encrypt, KeyPair, KeyStore, Passphrase};
//!
//! # fn main() -> numbat_core::Result<()> {
//! let store = KeyStore::default();
//! let key_pair = KeyPair::generate(2048)?;
//! store.save(&key_pair, "private_key.pem", "public_key.pem", Passphrase::from("correct horse"))?;
//!
//! let public_key = store.load_public("public_key.pem")?;
//! let ciphertext = encrypt(&public_key, b"hello")?;
//!
//! let private_key = store.load_private("private_key.pem", Passphrase::from("correct horse"))?;
//! assert_eq!(decrypt(&private_key, &ciphertext)?.as_slice(), b"hello");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod crypto;
pub mod error;
pub mod passphrase;
pub mod storage;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::KeyStoreConfig;
pub use crypto::{
    constant_time_eq, decrypt, encrypt, max_message_len, zero, KdfParams, KeyPair, PrivateKey,
    PublicKey,
};
pub use error::{Error, Result};
pub use passphrase::{capture, Passphrase};
pub use storage::{load_private, load_public, save, KeyStore};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Numbat Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
