//! # Hybrid Demo
//!
//! Walks through the full key lifecycle: generate a key pair, protect the
//! private key with a passphrase, load both halves back and exchange an
//! RSA-OAEP message.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example hybrid_demo
//! ```

use numbat_core::crypto::{open, EncryptedEnvelope, SALT_SIZE};
use numbat_core::storage::{pem, PRIVATE_KEY_LABEL};
use numbat_core::{decrypt, encrypt, max_message_len, KeyPair, KeyStore, Passphrase};

fn main() {
    println!("=== Numbat Core: Key Lifecycle Demo ===\n");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = KeyStore::default();

    // Step 1: Generate a key pair
    println!("Step 1: Generating a 2048-bit RSA key pair...");

    let key_pair = KeyPair::generate(2048).expect("Failed to generate key pair");
    let fingerprint = key_pair
        .public_key()
        .fingerprint()
        .expect("Failed to fingerprint public key");

    println!("  Fingerprint: {}", fingerprint);
    println!(
        "  Largest message: {} bytes",
        max_message_len(key_pair.public_key())
    );
    println!();

    // Step 2: Save both halves
    println!("Step 2: Saving the key pair under a passphrase...");
    println!();
    println!("  ┌─────────────────────────────────────────────────────────────┐");
    println!("  │                    PRIVATE KEY AT REST                      │");
    println!("  ├─────────────────────────────────────────────────────────────┤");
    println!("  │                                                             │");
    println!("  │   \"correct horse\" ──► Argon2id ──► AES-256 key             │");
    println!("  │                          ▲             │                    │");
    println!("  │                     random salt        ▼                    │");
    println!("  │   PKCS#8 DER ─────────────────► AES-256-GCM ──► envelope   │");
    println!("  │                                                             │");
    println!("  │   envelope = salt ‖ nonce ‖ ciphertext ‖ tag               │");
    println!("  │                                                             │");
    println!("  └─────────────────────────────────────────────────────────────┘");
    println!();

    store
        .save_to_dir(&key_pair, dir.path(), Passphrase::from("correct horse"))
        .expect("Failed to save key pair");

    let private_path = store.private_key_path(dir.path());
    let public_path = store.public_key_path(dir.path());

    let private_file = std::fs::read(&private_path).expect("Failed to read private key");
    let envelope_bytes =
        pem::decode_labeled(&private_file, PRIVATE_KEY_LABEL).expect("Failed to decode container");
    let envelope = EncryptedEnvelope::parse(&envelope_bytes).expect("Failed to parse envelope");

    println!("  Private key file: {}", private_path.display());
    println!("  Public key file:  {}", public_path.display());
    println!("  Salt (hex): {}", hex::encode(envelope.salt));
    println!("  Nonce (hex): {}", hex::encode(envelope.nonce.as_bytes()));
    println!("  Envelope length: {} bytes", envelope_bytes.len());
    println!();

    // Step 3: Encrypt to the public key
    println!("Step 3: Encrypting a message to the saved public key...");

    let public_key = store.load_public(&public_path).expect("Failed to load public key");
    let message = b"start:alice";
    let ciphertext = encrypt(&public_key, message).expect("Encryption failed");

    println!("  Plaintext: \"{}\"", String::from_utf8_lossy(message));
    println!("  Ciphertext (hex): {}...", hex::encode(&ciphertext[..16]));
    println!("  Ciphertext length: {} bytes", ciphertext.len());
    println!();

    // Step 4: Unlock the private key and decrypt
    println!("Step 4: Unlocking the private key and decrypting...");

    let private_key = store
        .load_private(&private_path, Passphrase::from("correct horse"))
        .expect("Failed to load private key");
    let decrypted = decrypt(&private_key, &ciphertext).expect("Decryption failed");

    println!("  Decrypted: \"{}\"", String::from_utf8_lossy(&decrypted));

    if decrypted.as_slice() == message {
        println!("  [OK] Message decrypted successfully!");
    } else {
        println!("  [FAILED] Decryption produced wrong result!");
    }
    println!();

    // Step 5: Failure modes
    println!("Step 5: Wrong passphrase and tamper detection...");

    match store.load_private(&private_path, Passphrase::from("battery staple")) {
        Ok(_) => println!("  [FAILED] Wrong passphrase was accepted!"),
        Err(e) => println!("  [OK] Wrong passphrase rejected: {}", e),
    }

    let mut tampered = envelope_bytes.clone();
    tampered[SALT_SIZE] ^= 0xFF;
    match open(&tampered, b"correct horse") {
        Ok(_) => println!("  [FAILED] Tampered envelope was accepted!"),
        Err(e) => println!("  [OK] Tampered envelope rejected: {}", e),
    }

    let oversized = vec![b'x'; max_message_len(&public_key) + 1];
    match encrypt(&public_key, &oversized) {
        Ok(_) => println!("  [FAILED] Oversized message was accepted!"),
        Err(e) => println!("  [OK] Oversized message rejected: {}", e),
    }
    println!();

    println!("=== Example Complete ===");
}
