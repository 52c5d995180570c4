//! End-to-end key lifecycle: generate, save, load, encrypt, decrypt.

use numbat_core::passphrase::{capture_from, SecretSource};
use numbat_core::{
    decrypt, encrypt, load_private, load_public, max_message_len, save, Error, KdfParams, KeyPair,
    KeyStore, KeyStoreConfig, Passphrase, Result,
};
use zeroize::Zeroizing;

/// Answers every prompt with the same line
struct Repeat(&'static str);

impl SecretSource for Repeat {
    fn read_secret(&mut self, _prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(self.0.as_bytes().to_vec()))
    }
}

fn fast_store() -> KeyStore {
    KeyStore::new(KeyStoreConfig {
        kdf: KdfParams {
            time_cost: 1,
            memory_kib: 64,
            lanes: 1,
            output_len: 32,
        },
        ..KeyStoreConfig::default()
    })
}

#[test]
fn test_generate_save_load_encrypt_decrypt() {
    let dir = tempfile::tempdir().unwrap();
    let private_path = dir.path().join("priv.pem");
    let public_path = dir.path().join("pub.pem");

    let key_pair = KeyPair::generate(2048).unwrap();
    save(&key_pair, &private_path, &public_path, Passphrase::from("correct horse")).unwrap();

    let public_key = load_public(&public_path).unwrap();
    let ciphertext = encrypt(&public_key, b"hello").unwrap();

    let private_key = load_private(&private_path, Passphrase::from("correct horse")).unwrap();
    let plaintext = decrypt(&private_key, &ciphertext).unwrap();

    assert_eq!(plaintext.as_slice(), b"hello");
}

#[test]
fn test_captured_passphrase_unlocks_saved_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store();
    let key_pair = store.generate().unwrap();

    let passphrase = capture_from(&mut Repeat("correct horse"), true).unwrap();
    store.save_to_dir(&key_pair, dir.path(), passphrase).unwrap();

    let passphrase = capture_from(&mut Repeat("correct horse"), false).unwrap();
    let private_key = store
        .load_private(store.private_key_path(dir.path()), passphrase)
        .unwrap();

    let rebuilt = KeyPair::from_private(private_key);
    assert_eq!(rebuilt.public_key(), key_pair.public_key());
    assert_eq!(rebuilt.key_size_bits(), 2048);
}

#[test]
fn test_wrong_passphrase_and_oversized_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store();
    let key_pair = store.generate().unwrap();
    store
        .save_to_dir(&key_pair, dir.path(), Passphrase::from("correct horse"))
        .unwrap();

    let result = store.load_private(store.private_key_path(dir.path()), Passphrase::from("wrong"));
    assert!(matches!(result, Err(Error::DecryptFailed)));

    let public_key = store.load_public(store.public_key_path(dir.path())).unwrap();
    let too_long = vec![b'x'; max_message_len(&public_key) + 1];
    assert!(matches!(
        encrypt(&public_key, &too_long),
        Err(Error::MessageTooLarge { .. })
    ));
}

#[test]
fn test_fingerprint_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store();
    let key_pair = store.generate().unwrap();
    store
        .save_to_dir(&key_pair, dir.path(), Passphrase::from("pw"))
        .unwrap();

    let loaded = store.load_public(store.public_key_path(dir.path())).unwrap();

    assert_eq!(
        loaded.fingerprint().unwrap(),
        key_pair.public_key().fingerprint().unwrap()
    );
}
