//! Numbat key tool
//!
//! Generates passphrase-protected key pairs and encrypts short messages to
//! them:
//!
//! 1. **keygen**: prompt for a passphrase twice, generate an RSA key pair and
//!    write `private_key.pem` / `public_key.pem` into a key directory.
//!
//! 2. **encrypt / decrypt**: RSA-OAEP a message to a public key file, or open
//!    a ciphertext with a private key file.
//!
//! 3. **self-test**: encrypt to the stored public key, unlock the stored
//!    private key and check the message survives the round trip.
//!
//! Prompts and logs go to stderr; stdout carries only results.

use std::io;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Section;
use zeroize::Zeroizing;

use numbat_core::passphrase::{capture_from, SecretSource, TerminalSource};
use numbat_core::{decrypt, encrypt, max_message_len, KeyPair, KeyStore, KeyStoreConfig, Passphrase};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "numbat", version, about = "Numbat key management")]
struct Args {
    /// Key store configuration file (TOML)
    #[arg(long, global = true, env = "NUMBAT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and save a new key pair
    Keygen {
        /// Modulus size in bits (defaults to the configured size)
        #[arg(long)]
        bits: Option<usize>,

        /// Directory to write the key files into
        #[arg(long, default_value = "keys", env = "NUMBAT_KEY_DIR")]
        dir: PathBuf,

        /// Overwrite existing key files
        #[arg(long)]
        force: bool,
    },

    /// Encrypt a message to a public key
    Encrypt {
        /// Recipient's public key file
        #[arg(long)]
        public_key: PathBuf,

        /// Message to encrypt; read without echo if omitted
        #[arg(long)]
        message: Option<String>,
    },

    /// Decrypt a message with a private key
    Decrypt {
        /// Encrypted private key file
        #[arg(long)]
        private_key: PathBuf,

        /// Base64 ciphertext
        #[arg(long)]
        ciphertext: String,
    },

    /// Encrypt to the stored public key and decrypt with the stored private key
    SelfTest {
        /// Directory holding the key files
        #[arg(long, default_value = "keys", env = "NUMBAT_KEY_DIR")]
        dir: PathBuf,

        /// Message to round-trip; read without echo if omitted
        #[arg(long)]
        message: Option<String>,
    },
}

// ── Entry Point ───────────────────────────────────────────────────────────────

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "numbat=info,numbat_core=info".into()),
        )
        .init();

    let args = Args::parse();
    let store = KeyStore::new(load_config(args.config.as_deref())?);

    tracing::debug!("numbat-core v{}", numbat_core::version());

    let mut terminal = TerminalSource::with_writer(io::stderr());

    let result = match args.command {
        Command::Keygen { bits, dir, force } => keygen(&store, &mut terminal, bits, &dir, force),
        Command::Encrypt {
            public_key,
            message,
        } => {
            let message = message_bytes(&mut terminal, message)?;
            let ciphertext = encrypt_to(&store, &public_key, &message)?;
            println!("{}", ciphertext);
            Ok(())
        }
        Command::Decrypt {
            private_key,
            ciphertext,
        } => {
            let passphrase = capture_from(&mut terminal, false)?;
            let plaintext = decrypt_with(&store, &private_key, &ciphertext, passphrase)?;
            println!("{}", String::from_utf8_lossy(&plaintext));
            Ok(())
        }
        Command::SelfTest { dir, message } => self_test(&store, &mut terminal, &dir, message),
    };

    result.map_err(|report| match user_hint(&report) {
        Some(hint) => report.suggestion(hint),
        None => report,
    })
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> color_eyre::Result<KeyStoreConfig> {
    match path {
        Some(path) => KeyStoreConfig::from_file(path)
            .wrap_err_with(|| format!("failed to load config {}", path.display())),
        None => Ok(KeyStoreConfig::default()),
    }
}

fn keygen(
    store: &KeyStore,
    terminal: &mut impl SecretSource,
    bits: Option<usize>,
    dir: &Path,
    force: bool,
) -> color_eyre::Result<()> {
    let private_path = store.private_key_path(dir);
    let public_path = store.public_key_path(dir);
    ensure_writable(&[&private_path, &public_path], force)?;

    let passphrase = capture_from(terminal, true)?;

    let bits = bits.unwrap_or(store.config().key_bits);
    eprintln!("Generating {}-bit key pair...", bits);
    let key_pair = KeyPair::generate(bits)?;

    store.save_to_dir(&key_pair, dir, passphrase)?;

    println!("Private key: {}", private_path.display());
    println!("Public key:  {}", public_path.display());
    println!("Fingerprint: {}", key_pair.public_key().fingerprint()?);
    Ok(())
}

fn self_test(
    store: &KeyStore,
    terminal: &mut impl SecretSource,
    dir: &Path,
    message: Option<String>,
) -> color_eyre::Result<()> {
    let message = message_bytes(terminal, message)?;
    let ciphertext = encrypt_to(store, &store.public_key_path(dir), &message)?;
    println!("Encrypted message: {}", ciphertext);

    let passphrase = capture_from(terminal, false)?;
    let plaintext = decrypt_with(store, &store.private_key_path(dir), &ciphertext, passphrase)?;
    println!("Decrypted message: {}", String::from_utf8_lossy(&plaintext));

    if plaintext.as_slice() != message.as_slice() {
        bail!("round trip produced a different message");
    }

    tracing::info!("Self-test passed");
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn ensure_writable(paths: &[&Path], force: bool) -> color_eyre::Result<()> {
    if force {
        return Ok(());
    }

    if let Some(existing) = paths.iter().find(|p| p.exists()) {
        bail!(
            "{} already exists; pass --force to overwrite",
            existing.display()
        );
    }

    Ok(())
}

/// Suggestion for failures the user can fix by trying again
fn user_hint(report: &color_eyre::Report) -> Option<&'static str> {
    let err = report
        .chain()
        .find_map(|cause| cause.downcast_ref::<numbat_core::Error>())?;

    if !err.requires_user_action() {
        return None;
    }

    Some(match err {
        numbat_core::Error::PassphraseMismatch => "The two entries differ; run the command again",
        numbat_core::Error::MessageTooLarge { .. } => "Shorten the message or use a larger key",
        _ => "Check the passphrase and that the ciphertext was made for this key",
    })
}

fn message_bytes(
    terminal: &mut impl SecretSource,
    message: Option<String>,
) -> color_eyre::Result<Zeroizing<Vec<u8>>> {
    match message {
        Some(message) => Ok(Zeroizing::new(message.into_bytes())),
        None => Ok(terminal.read_secret("Enter your message: ")?),
    }
}

fn encrypt_to(store: &KeyStore, public_key: &Path, message: &[u8]) -> color_eyre::Result<String> {
    let public_key = store
        .load_public(public_key)
        .wrap_err_with(|| format!("failed to load {}", public_key.display()))?;

    tracing::debug!(
        "Encrypting {} bytes (limit {})",
        message.len(),
        max_message_len(&public_key)
    );

    let ciphertext = encrypt(&public_key, message)?;
    Ok(STANDARD.encode(ciphertext))
}

fn decrypt_with(
    store: &KeyStore,
    private_key: &Path,
    ciphertext: &str,
    passphrase: Passphrase,
) -> color_eyre::Result<Zeroizing<Vec<u8>>> {
    let ciphertext = STANDARD
        .decode(ciphertext.trim())
        .wrap_err("ciphertext is not valid base64")?;

    let private_key = store
        .load_private(private_key, passphrase)
        .wrap_err_with(|| format!("failed to unlock {}", private_key.display()))?;

    Ok(decrypt(&private_key, &ciphertext)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
