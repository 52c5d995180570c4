//! # Cryptography Module
//!
//! This module provides all cryptographic primitives used by Numbat Core.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 PRIVATE KEY AT REST                             │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Passphrase ──► Argon2id (t=1, m=64 MiB, p=4) ──► 32-byte key  │   │
//! │  │                          ▲                                      │   │
//! │  │                          │ salt (16 random bytes)               │   │
//! │  │                                                                 │   │
//! │  │  PKCS#8 DER ──► AES-256-GCM(key, random nonce) ──► envelope    │   │
//! │  │                                                                 │   │
//! │  │  envelope = salt ‖ nonce ‖ ciphertext ‖ tag                    │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 MESSAGE ENCRYPTION                              │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  RSA-OAEP (SHA-256, empty label)                               │   │
//! │  │  • One block per message, bounded by the modulus size          │   │
//! │  │  • Randomized: same message encrypts differently each time     │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices & Rationale
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | RSA (2048-4096) | Message encryption | Interoperable PKCS#8 / PKIX key files |
//! | OAEP-SHA256 | RSA padding | Semantic security, CCA resistance |
//! | Argon2id | Passphrase KDF | Memory-hard, resists GPU guessing |
//! | AES-256-GCM | Envelope AEAD | Hardware acceleration, authenticated |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: Derived keys, decrypted DER and passphrases are zeroized when dropped
//! 2. **Secure Random**: `rand::rngs::OsRng` for salts, nonces and key generation
//! 3. **No Nonce Reuse**: Fresh salt and nonce on every seal
//! 4. **No Oracle**: Every decryption failure is the same error

mod encryption;
mod kdf;
mod keys;
pub mod memory;
mod oaep;

pub use encryption::{
    decrypt as aead_decrypt, encrypt as aead_encrypt, open, open_with, seal, seal_with,
    EncryptedEnvelope, EncryptionKey, Nonce, KEY_SIZE, MIN_ENVELOPE_SIZE, NONCE_SIZE, TAG_SIZE,
};
pub use kdf::{derive_key, derive_key_with, generate_salt, KdfParams, SALT_SIZE};
pub use keys::{KeyPair, PrivateKey, PublicKey, DEFAULT_KEY_BITS, MAX_KEY_BITS, MIN_KEY_BITS};
pub use memory::{constant_time_eq, zero};
pub use oaep::{decrypt, encrypt, max_message_len};

#[cfg(test)]
pub(crate) use kdf::tests::FAST as FAST_KDF_PARAMS;
#[cfg(test)]
pub(crate) use keys::tests::{ed25519_pkcs8_der, ed25519_spki_der};
