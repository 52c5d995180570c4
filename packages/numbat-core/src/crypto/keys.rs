//! # Key Management
//!
//! This module handles RSA key pair generation and the DER forms the key
//! halves are stored in.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  PrivateKey (RSA)                                               │   │
//! │  │  ─────────────────                                               │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • Decrypting OAEP messages addressed to us                     │   │
//! │  │                                                                  │   │
//! │  │  Format:                                                        │   │
//! │  │  • PKCS#8 DER, only ever written inside an encrypted envelope   │   │
//! │  │  • Not Clone; CRT components zeroized on drop                   │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  PublicKey (RSA)                                                │   │
//! │  │  ────────────────                                                │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • Encrypting messages for the key owner                        │   │
//! │  │                                                                  │   │
//! │  │  Format:                                                        │   │
//! │  │  • SubjectPublicKeyInfo (PKIX) DER, stored in clear             │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  KeyPair                                                        │   │
//! │  │  ───────                                                         │   │
//! │  │                                                                  │   │
//! │  │  Both halves from the same generation call, plus the modulus    │   │
//! │  │  size that was requested.                                       │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, PrivateKeyInfo, SubjectPublicKeyInfoRef};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Smallest modulus size accepted by [`KeyPair::generate`]
pub const MIN_KEY_BITS: usize = 1024;

/// Largest modulus size accepted by [`KeyPair::generate`]
pub const MAX_KEY_BITS: usize = 4096;

/// Modulus size used when none is configured
pub const DEFAULT_KEY_BITS: usize = 2048;

/// An RSA key pair
///
/// ## Security
///
/// - The private half is not `Clone`; it lives exactly as long as this value
/// - The public half can be cloned and shared freely
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
    key_size_bits: usize,
}

impl KeyPair {
    /// Generate a new random key pair
    ///
    /// Blocks on prime search; 4096-bit keys can take several seconds.
    ///
    /// ## Errors
    ///
    /// `KeyGenFailed` if `bits` is outside `MIN_KEY_BITS..=MAX_KEY_BITS` or
    /// the generator fails.
    pub fn generate(bits: usize) -> Result<Self> {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
            return Err(Error::KeyGenFailed(format!(
                "key size must be between {} and {} bits, got {}",
                MIN_KEY_BITS, MAX_KEY_BITS, bits
            )));
        }

        tracing::debug!("Generating {}-bit RSA key pair", bits);

        let inner = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| Error::KeyGenFailed(e.to_string()))?;
        let private_key = PrivateKey { inner };
        let public_key = private_key.public_key();

        Ok(Self {
            private_key,
            public_key,
            key_size_bits: bits,
        })
    }

    /// Rebuild a pair around an existing private key
    pub fn from_private(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        let key_size_bits = private_key.bits();

        Self {
            private_key,
            public_key,
            key_size_bits,
        }
    }

    /// The private half
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// The public half
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Requested modulus size in bits
    pub fn key_size_bits(&self) -> usize {
        self.key_size_bits
    }

    /// Split into the two halves
    pub fn into_parts(self) -> (PrivateKey, PublicKey) {
        (self.private_key, self.public_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("key_size_bits", &self.key_size_bits)
            .finish_non_exhaustive()
    }
}

/// RSA private key
pub struct PrivateKey {
    // RsaPrivateKey zeroizes d, the primes and the CRT values on drop.
    inner: RsaPrivateKey,
}

impl PrivateKey {
    /// Derive the matching public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.to_public_key(),
        }
    }

    /// Modulus size in bytes
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.inner.size() * 8
    }

    /// Encode as PKCS#8 DER
    ///
    /// ## Security Warning
    ///
    /// The result is the raw private key. It is zeroized on drop; only hand
    /// it to the envelope codec.
    pub fn to_pkcs8_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let document = self
            .inner
            .to_pkcs8_der()
            .map_err(|e| Error::SerializationFailed(format!("private key: {}", e)))?;

        Ok(Zeroizing::new(document.as_bytes().to_vec()))
    }

    /// Decode from PKCS#8 DER
    ///
    /// ## Errors
    ///
    /// - `SerializationFailed` if the bytes are not a well-formed PKCS#8
    ///   RSA key
    /// - `WrongKeyType` if they are PKCS#8 for some other algorithm
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::try_from(der)
            .map_err(|e| Error::SerializationFailed(format!("private key: {}", e)))?;

        if info.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
            return Err(Error::WrongKeyType(format!(
                "expected RSA private key, found algorithm {}",
                info.algorithm.oid
            )));
        }

        let inner = RsaPrivateKey::try_from(info)
            .map_err(|e| Error::SerializationFailed(format!("private key: {}", e)))?;
        inner
            .validate()
            .map_err(|e| Error::SerializationFailed(format!("private key: {}", e)))?;

        Ok(Self { inner })
    }

    pub(crate) fn as_rsa(&self) -> &RsaPrivateKey {
        &self.inner
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// RSA public key
///
/// Contains only public information and can be serialized, transmitted
/// and stored without security concerns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

impl PublicKey {
    /// Modulus size in bytes
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.inner.size() * 8
    }

    /// Encode as SubjectPublicKeyInfo DER
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_public_key_der()
            .map(|doc| doc.into_vec())
            .map_err(|e| Error::SerializationFailed(format!("public key: {}", e)))
    }

    /// Decode from SubjectPublicKeyInfo DER
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoRef::try_from(der)
            .map_err(|e| Error::SerializationFailed(format!("public key: {}", e)))?;

        if spki.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
            return Err(Error::WrongKeyType(format!(
                "expected RSA public key, found algorithm {}",
                spki.algorithm.oid
            )));
        }

        let inner = RsaPublicKey::try_from(spki)
            .map_err(|e| Error::SerializationFailed(format!("public key: {}", e)))?;

        Ok(Self { inner })
    }

    /// SHA-256 of the DER encoding, as lowercase hex
    ///
    /// Handy for comparing keys by eye (e.g. after copying a public key file
    /// to another machine).
    pub fn fingerprint(&self) -> Result<String> {
        let der = self.to_der()?;
        Ok(hex::encode(Sha256::digest(&der)))
    }

    pub(crate) fn as_rsa(&self) -> &RsaPublicKey {
        &self.inner
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// PKCS#8 v1 wrapper around an all-zero Ed25519 seed (RFC 8410 layout).
    pub(crate) fn ed25519_pkcs8_der() -> Vec<u8> {
        let mut der = vec![
            0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22,
            0x04, 0x20,
        ];
        der.extend_from_slice(&[0u8; 32]);
        der
    }

    /// SubjectPublicKeyInfo for an all-zero Ed25519 public key.
    pub(crate) fn ed25519_spki_der() -> Vec<u8> {
        let mut der = vec![
            0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
        ];
        der.extend_from_slice(&[0u8; 32]);
        der
    }

    #[test]
    fn test_keypair_generation() {
        let kp = KeyPair::generate(2048).unwrap();

        assert_eq!(kp.key_size_bits(), 2048);
        assert_eq!(kp.public_key().bits(), 2048);
        assert_eq!(kp.private_key().size(), 256);
        assert_eq!(&kp.private_key().public_key(), kp.public_key());
    }

    #[test]
    fn test_keypairs_are_distinct() {
        let kp1 = KeyPair::generate(1024).unwrap();
        let kp2 = KeyPair::generate(1024).unwrap();

        assert_ne!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn test_generate_rejects_out_of_range_sizes() {
        assert!(matches!(KeyPair::generate(512), Err(Error::KeyGenFailed(_))));
        assert!(matches!(KeyPair::generate(0), Err(Error::KeyGenFailed(_))));
        assert!(matches!(KeyPair::generate(8192), Err(Error::KeyGenFailed(_))));
    }

    #[test]
    fn test_private_key_der_round_trip() {
        let kp = KeyPair::generate(1024).unwrap();

        let der = kp.private_key().to_pkcs8_der().unwrap();
        let restored = PrivateKey::from_pkcs8_der(&der).unwrap();

        assert_eq!(&restored.public_key(), kp.public_key());
    }

    #[test]
    fn test_public_key_der_round_trip() {
        let kp = KeyPair::generate(1024).unwrap();

        let der = kp.public_key().to_der().unwrap();
        let restored = PublicKey::from_der(&der).unwrap();

        assert_eq!(&restored, kp.public_key());
    }

    #[test]
    fn test_from_private_rebuilds_pair() {
        let (private, public) = KeyPair::generate(1024).unwrap().into_parts();
        let rebuilt = KeyPair::from_private(private);

        assert_eq!(rebuilt.public_key(), &public);
        assert_eq!(rebuilt.key_size_bits(), 1024);
    }

    #[test]
    fn test_non_rsa_private_key_is_wrong_type() {
        let result = PrivateKey::from_pkcs8_der(&ed25519_pkcs8_der());
        assert!(matches!(result, Err(Error::WrongKeyType(_))));
    }

    #[test]
    fn test_non_rsa_public_key_is_wrong_type() {
        let result = PublicKey::from_der(&ed25519_spki_der());
        assert!(matches!(result, Err(Error::WrongKeyType(_))));
    }

    #[test]
    fn test_garbage_der_is_serialization_error() {
        assert!(matches!(
            PrivateKey::from_pkcs8_der(b"not der at all"),
            Err(Error::SerializationFailed(_))
        ));
        assert!(matches!(
            PublicKey::from_der(&[0x30, 0x03, 0x02, 0x01]),
            Err(Error::SerializationFailed(_))
        ));
    }

    #[test]
    fn test_fingerprint() {
        let kp = KeyPair::generate(1024).unwrap();

        let fp1 = kp.public_key().fingerprint().unwrap();
        let fp2 = kp.public_key().clone().fingerprint().unwrap();

        assert_eq!(fp1.len(), 64);
        assert_eq!(fp1, fp2);
        assert!(fp1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let kp = KeyPair::generate(1024).unwrap();
        let debug = format!("{:?}", kp.private_key());

        assert!(debug.contains("bits: 1024"));
        assert!(!debug.contains("inner"));
    }
}
