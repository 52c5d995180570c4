//! # Message Encryption (RSA-OAEP)
//!
//! Single-shot public-key encryption of short payloads, such as the control
//! messages a chat client sends. There is no symmetric session key and no
//! chunking: a message must fit in one RSA block.
//!
//! ## Size Bound
//!
//! ```text
//! max_plaintext = modulus_bytes - 2 * hash_len - 2
//!
//!   2048-bit key: 256 - 64 - 2 = 190 bytes
//!   3072-bit key: 384 - 64 - 2 = 318 bytes
//!   4096-bit key: 512 - 64 - 2 = 446 bytes
//! ```
//!
//! Hash is SHA-256 for both OAEP and MGF1; the label is empty.

use rand::rngs::OsRng;
use rsa::Oaep;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::keys::{PrivateKey, PublicKey};
use crate::error::{Error, Result};

/// SHA-256 output size, which sets the OAEP padding overhead
const HASH_LEN: usize = 32;

/// Largest plaintext `key` can encrypt
pub fn max_message_len(key: &PublicKey) -> usize {
    key.size().saturating_sub(2 * HASH_LEN + 2)
}

/// Encrypt `plaintext` for the owner of `public_key`
///
/// ## Errors
///
/// `MessageTooLarge` if `plaintext` is longer than [`max_message_len`].
pub fn encrypt(public_key: &PublicKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let max = max_message_len(public_key);
    if plaintext.len() > max {
        return Err(Error::MessageTooLarge {
            len: plaintext.len(),
            max,
        });
    }

    public_key
        .as_rsa()
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| match e {
            rsa::Error::MessageTooLong => Error::MessageTooLarge {
                len: plaintext.len(),
                max,
            },
            other => Error::EncryptionFailed(other.to_string()),
        })
}

/// Decrypt a ciphertext produced by [`encrypt`]
///
/// ## Errors
///
/// `DecryptFailed` if the length is not the modulus size, the padding does
/// not verify, or the key is wrong.
pub fn decrypt(private_key: &PrivateKey, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() != private_key.size() {
        return Err(Error::DecryptFailed);
    }

    private_key
        .as_rsa()
        .decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| Error::DecryptFailed)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let kp = KeyPair::generate(2048).unwrap();

        let ciphertext = encrypt(kp.public_key(), b"start:alice").unwrap();
        let plaintext = decrypt(kp.private_key(), &ciphertext).unwrap();

        assert_eq!(ciphertext.len(), 256);
        assert_eq!(plaintext.as_slice(), b"start:alice");
    }

    #[test]
    fn test_encryption_is_randomized() {
        let kp = KeyPair::generate(1024).unwrap();

        let c1 = encrypt(kp.public_key(), b"ok").unwrap();
        let c2 = encrypt(kp.public_key(), b"ok").unwrap();

        assert_ne!(c1, c2);
    }

    #[test]
    fn test_empty_message() {
        let kp = KeyPair::generate(1024).unwrap();

        let ciphertext = encrypt(kp.public_key(), b"").unwrap();
        let plaintext = decrypt(kp.private_key(), &ciphertext).unwrap();

        assert!(plaintext.is_empty());
    }

    #[test]
    fn test_max_message_len() {
        let kp = KeyPair::generate(2048).unwrap();
        assert_eq!(max_message_len(kp.public_key()), 190);
    }

    #[test]
    fn test_size_bound_is_exact() {
        let kp = KeyPair::generate(2048).unwrap();
        let max = max_message_len(kp.public_key());

        let at_limit = vec![0xA5u8; max];
        let ciphertext = encrypt(kp.public_key(), &at_limit).unwrap();
        assert_eq!(decrypt(kp.private_key(), &ciphertext).unwrap().as_slice(), at_limit);

        let over_limit = vec![0xA5u8; max + 1];
        let result = encrypt(kp.public_key(), &over_limit);
        assert!(matches!(
            result,
            Err(Error::MessageTooLarge { len, max: m }) if len == max + 1 && m == max
        ));
    }

    #[test]
    fn test_wrong_length_ciphertext() {
        let kp = KeyPair::generate(1024).unwrap();
        let mut ciphertext = encrypt(kp.public_key(), b"hello").unwrap();

        ciphertext.pop();
        assert!(matches!(decrypt(kp.private_key(), &ciphertext), Err(Error::DecryptFailed)));

        ciphertext.extend_from_slice(&[0, 0]);
        assert!(matches!(decrypt(kp.private_key(), &ciphertext), Err(Error::DecryptFailed)));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let kp = KeyPair::generate(1024).unwrap();
        let mut ciphertext = encrypt(kp.public_key(), b"hello").unwrap();

        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;

        assert!(matches!(decrypt(kp.private_key(), &ciphertext), Err(Error::DecryptFailed)));
    }

    #[test]
    fn test_wrong_private_key() {
        let alice = KeyPair::generate(1024).unwrap();
        let bob = KeyPair::generate(1024).unwrap();

        let ciphertext = encrypt(alice.public_key(), b"for alice").unwrap();

        assert!(matches!(decrypt(bob.private_key(), &ciphertext), Err(Error::DecryptFailed)));
    }
}
