//! # Key Derivation Functions
//!
//! This module turns a user passphrase into the AES-256-GCM key that
//! protects a private key on disk.
//!
//! ## Derivation
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    PASSPHRASE KEY DERIVATION                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────┐     ┌─────────────────────────┐           │
//! │  │  Passphrase (bytes)     │     │  Salt (16 random bytes) │           │
//! │  └────────────┬────────────┘     └────────────┬────────────┘           │
//! │               │                               │                        │
//! │               └───────────────┬───────────────┘                        │
//! │                               ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Argon2id v1.3(                                                 │   │
//! │  │    time_cost   = 1,                                             │   │
//! │  │    memory      = 64 MiB,                                        │   │
//! │  │    parallelism = 4,                                             │   │
//! │  │    output_len  = 32                                             │   │
//! │  │  )                                                              │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │                               ▼                                        │
//! │                   32-byte AES-256-GCM key                              │
//! │             (zeroized on drop, never persisted)                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Compatibility
//!
//! The default parameters are part of the key file format: the salt is
//! stored, the parameters are not. A key file sealed with other parameters
//! can only be opened by a caller configured with the same ones.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::encryption::{EncryptionKey, KEY_SIZE};
use crate::error::{Error, Result};

/// Size of the random salt in bytes
pub const SALT_SIZE: usize = 16;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Number of passes over memory
    pub time_cost: u32,
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Degree of parallelism
    pub lanes: u32,
    /// Output length in bytes (must be 32)
    pub output_len: usize,
}

impl KdfParams {
    /// The parameters every key file is written with by default
    pub const DEFAULT: KdfParams = KdfParams {
        time_cost: 1,
        memory_kib: 64 * 1024,
        lanes: 4,
        output_len: KEY_SIZE,
    };

    fn to_argon2(self) -> Result<Argon2<'static>> {
        if self.output_len != KEY_SIZE {
            return Err(Error::KeyDerivationFailed(format!(
                "output length must be {} bytes, got {}",
                KEY_SIZE, self.output_len
            )));
        }

        let params = Params::new(
            self.memory_kib,
            self.time_cost,
            self.lanes,
            Some(self.output_len),
        )
        .map_err(|e| Error::KeyDerivationFailed(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Generate a random salt from the OS CSPRNG
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 32-byte key from a passphrase and salt with the default parameters
pub fn derive_key(passphrase: &[u8], salt: &[u8]) -> Result<EncryptionKey> {
    derive_key_with(&KdfParams::DEFAULT, passphrase, salt)
}

/// Derive a 32-byte key from a passphrase and salt
pub fn derive_key_with(params: &KdfParams, passphrase: &[u8], salt: &[u8]) -> Result<EncryptionKey> {
    let argon2 = params.to_argon2()?;

    // Hash straight into the zeroizing wrapper so no bare copy of the key
    // is left on the stack.
    let mut key = EncryptionKey::from_bytes([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(passphrase, salt, key.as_mut_bytes())
        .map_err(|e| Error::KeyDerivationFailed(e.to_string()))?;

    Ok(key)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Cheap parameters so unit tests don't each burn 64 MiB.
    pub(crate) const FAST: KdfParams = KdfParams {
        time_cost: 1,
        memory_kib: 64,
        lanes: 1,
        output_len: KEY_SIZE,
    };

    #[test]
    fn test_default_params_match_file_format() {
        let params = KdfParams::default();

        assert_eq!(params.time_cost, 1);
        assert_eq!(params.memory_kib, 65_536);
        assert_eq!(params.lanes, 4);
        assert_eq!(params.output_len, 32);
    }

    #[test]
    fn test_derive_key_deterministic() {
        let salt = [0x42u8; SALT_SIZE];

        let k1 = derive_key_with(&FAST, b"correct horse", &salt).unwrap();
        let k2 = derive_key_with(&FAST, b"correct horse", &salt).unwrap();

        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_passphrase() {
        let salt = [0x42u8; SALT_SIZE];

        let k1 = derive_key_with(&FAST, b"passphrase1", &salt).unwrap();
        let k2 = derive_key_with(&FAST, b"passphrase2", &salt).unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salt() {
        let k1 = derive_key_with(&FAST, b"passphrase", &[0x01; SALT_SIZE]).unwrap();
        let k2 = derive_key_with(&FAST, b"passphrase", &[0x02; SALT_SIZE]).unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_default_params() {
        let salt = [7u8; SALT_SIZE];

        let k1 = derive_key(b"correct horse", &salt).unwrap();
        let k2 = derive_key_with(&KdfParams::DEFAULT, b"correct horse", &salt).unwrap();

        assert_eq!(k1.as_bytes(), k2.as_bytes());
        assert_ne!(k1.as_bytes(), &[0u8; KEY_SIZE]);
    }

    #[test]
    fn test_rejects_wrong_output_len() {
        let params = KdfParams {
            output_len: 16,
            ..FAST
        };

        let result = derive_key_with(&params, b"passphrase", &[0u8; SALT_SIZE]);
        assert!(matches!(result, Err(Error::KeyDerivationFailed(_))));
    }

    #[test]
    fn test_rejects_invalid_params() {
        let params = KdfParams {
            lanes: 0,
            ..FAST
        };

        let result = derive_key_with(&params, b"passphrase", &[0u8; SALT_SIZE]);
        assert!(matches!(result, Err(Error::KeyDerivationFailed(_))));
    }

    #[test]
    fn test_generate_salt_unique() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
