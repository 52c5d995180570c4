//! # Envelope Encryption
//!
//! Passphrase-based AES-256-GCM sealing, used to protect the serialized
//! private key before it touches the disk.
//!
//! ## Envelope Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ENCRYPTED ENVELOPE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   0              16                28                                   │
//! │   ┌──────────────┬─────────────────┬──────────────────────────────┐    │
//! │   │ salt (16)    │ nonce (12)      │ ciphertext ‖ tag (16)        │    │
//! │   └──────────────┴─────────────────┴──────────────────────────────┘    │
//! │                                                                         │
//! │   salt  → Argon2id(passphrase, salt) → 32-byte key                     │
//! │   nonce → AES-256-GCM nonce, random per seal                           │
//! │   no associated data                                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Confidentiality | Plaintext only recoverable with the passphrase |
//! | Integrity | Any modification of salt, nonce, ciphertext or tag is detected |
//! | Freshness | Salt and nonce are drawn from `OsRng` on every seal |
//! | No oracle | Every open failure is the same `DecryptFailed` |

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use rand::RngCore;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use super::kdf::{derive_key_with, generate_salt, KdfParams, SALT_SIZE};
use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the encryption key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Smallest byte string that can possibly be an envelope
pub const MIN_ENVELOPE_SIZE: usize = SALT_SIZE + NONCE_SIZE;

/// A nonce (number used once) for AES-GCM encryption
///
/// ## Critical Security Requirement
///
/// **NEVER reuse a nonce with the same key!**
///
/// Every seal derives a new key from a new salt *and* draws a new random
/// nonce, so a (key, nonce) pair never repeats in practice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// An AES-256-GCM encryption key
///
/// Zeroized when dropped.
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_SIZE] {
        &mut self.0
    }
}

/// A parsed envelope: `salt || nonce || ciphertext-with-tag`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    /// Argon2id salt
    pub salt: [u8; SALT_SIZE],
    /// AES-GCM nonce
    pub nonce: Nonce,
    /// Ciphertext followed by the authentication tag
    pub ciphertext: Vec<u8>,
}

impl EncryptedEnvelope {
    /// Split raw envelope bytes into their parts
    ///
    /// Input shorter than salt + nonce is rejected with `DecryptFailed`, the
    /// same error a bad tag produces.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_ENVELOPE_SIZE {
            return Err(Error::DecryptFailed);
        }

        let (salt, rest) = bytes.split_at(SALT_SIZE);
        let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

        Ok(Self {
            salt: salt.try_into().map_err(|_| Error::DecryptFailed)?,
            nonce: Nonce::from_bytes(nonce.try_into().map_err(|_| Error::DecryptFailed)?),
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Serialize back to the on-disk layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_ENVELOPE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }
}

/// Encrypt `plaintext` under a key and fresh random nonce
///
/// Returns the nonce and the ciphertext with its tag appended.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<(Nonce, Vec<u8>)> {
    let nonce = Nonce::random();
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce.0), plaintext)
        .map_err(|e| Error::EncryptionFailed(format!("AES-GCM seal failed: {}", e)))?;

    Ok((nonce, ciphertext))
}

/// Decrypt and authenticate `ciphertext`
///
/// ## Errors
///
/// Returns `DecryptFailed` if the ciphertext or tag was modified, or the
/// key or nonce is wrong. The cause is never reported.
pub fn decrypt(key: &EncryptionKey, nonce: &Nonce, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = Aes256Gcm::new_from_slice(&key.0).map_err(|_| Error::DecryptFailed)?;

    cipher
        .decrypt(AesNonce::from_slice(&nonce.0), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| Error::DecryptFailed)
}

/// Seal `plaintext` under a passphrase with the default KDF parameters
pub fn seal(plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    seal_with(&KdfParams::DEFAULT, plaintext, passphrase)
}

/// Seal `plaintext` under a passphrase
///
/// ## Flow
///
/// ```text
/// salt  = OsRng(16)
/// key   = Argon2id(passphrase, salt)
/// nonce = OsRng(12)
/// out   = salt ‖ nonce ‖ AES-256-GCM(key, nonce, plaintext)
/// ```
pub fn seal_with(params: &KdfParams, plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    let salt = generate_salt();
    let key = derive_key_with(params, passphrase, &salt)?;
    let (nonce, ciphertext) = encrypt(&key, plaintext)?;

    Ok(EncryptedEnvelope {
        salt,
        nonce,
        ciphertext,
    }
    .to_bytes())
}

/// Open an envelope with the default KDF parameters
pub fn open(envelope: &[u8], passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    open_with(&KdfParams::DEFAULT, envelope, passphrase)
}

/// Open an envelope produced by [`seal_with`]
///
/// Truncated input, a wrong passphrase and tampering all return
/// `DecryptFailed`.
pub fn open_with(
    params: &KdfParams,
    envelope: &[u8],
    passphrase: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let envelope = EncryptedEnvelope::parse(envelope)?;
    let key = derive_key_with(params, passphrase, &envelope.salt)?;

    decrypt(&key, &envelope.nonce, &envelope.ciphertext)
}

// ============================================================================
// TESTS
// ============================================================================
