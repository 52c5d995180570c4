//! Saving and loading key pairs.
//!
//! ```text
//! save:
//!   PrivateKey ──► PKCS#8 DER ──► seal(passphrase) ──► ENCRYPTED PRIVATE KEY block ──► private file (0600)
//!   PublicKey  ──► SPKI DER   ─────────────────────────► PUBLIC KEY block          ──► public file  (0600)
//!
//! load_private:
//!   private file ──► ENCRYPTED PRIVATE KEY block ──► open(passphrase) ──► PKCS#8 DER ──► PrivateKey
//! ```
//!
//! The passphrase is taken by value and wiped as soon as the KDF has run.
//! Decrypted DER lives in a zeroizing buffer and is wiped before `load_private`
//! returns.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::pem::{self, PRIVATE_KEY_LABEL, PUBLIC_KEY_LABEL};
use crate::config::KeyStoreConfig;
use crate::crypto::{open_with, seal_with, KeyPair, PrivateKey, PublicKey};
use crate::error::{Error, Result};
use crate::passphrase::Passphrase;

/// Permission bits for both key files
#[cfg(unix)]
const OWNER_ONLY_MODE: u32 = 0o600;

/// Generates, saves and loads key pairs according to a [`KeyStoreConfig`]
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    config: KeyStoreConfig,
}

impl KeyStore {
    /// Create a key store with the given configuration
    pub fn new(config: KeyStoreConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    /// Generate a key pair of the configured size
    pub fn generate(&self) -> Result<KeyPair> {
        KeyPair::generate(self.config.key_bits)
    }

    /// Write `key_pair` to two files
    ///
    /// The private key is encrypted under `passphrase`; the public key is
    /// stored in the clear. Existing files are overwritten.
    ///
    /// Without `atomic_writes` a failure between the two writes can leave
    /// the private file written and the public file stale or missing.
    ///
    /// ## Errors
    ///
    /// - `SerializationFailed` if either key cannot be encoded
    /// - `KeyDerivationFailed` / `EncryptionFailed` if sealing fails
    /// - `IoFailed` if a file cannot be written
    pub fn save(
        &self,
        key_pair: &KeyPair,
        private_path: impl AsRef<Path>,
        public_path: impl AsRef<Path>,
        passphrase: Passphrase,
    ) -> Result<()> {
        let private_path = private_path.as_ref();
        let public_path = public_path.as_ref();

        let envelope = {
            let der = key_pair.private_key().to_pkcs8_der()?;
            let sealed = seal_with(&self.config.kdf, &der, passphrase.as_bytes());
            drop(passphrase);
            sealed?
        };

        let private_pem = pem::encode(PRIVATE_KEY_LABEL, &envelope)?;
        let public_pem = pem::encode(PUBLIC_KEY_LABEL, &key_pair.public_key().to_der()?)?;

        if self.config.atomic_writes {
            write_atomically(&[(private_path, &private_pem), (public_path, &public_pem)])?;
        } else {
            write_owner_only(private_path, &private_pem)?;
            write_owner_only(public_path, &public_pem)?;
        }

        tracing::info!(
            "Saved {}-bit key pair to {} and {}",
            key_pair.key_size_bits(),
            private_path.display(),
            public_path.display()
        );

        Ok(())
    }

    /// Read and decrypt a private key file
    ///
    /// ## Errors
    ///
    /// - `IoFailed` if the file cannot be read
    /// - `InvalidFormat` if it is not an `ENCRYPTED PRIVATE KEY` block
    /// - `DecryptFailed` for a wrong passphrase or a damaged file
    /// - `SerializationFailed` / `WrongKeyType` if the decrypted key is unusable
    pub fn load_private(&self, path: impl AsRef<Path>, passphrase: Passphrase) -> Result<PrivateKey> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(io_error(path))?;
        let envelope = pem::decode_labeled(&contents, PRIVATE_KEY_LABEL)?;

        let der = open_with(&self.config.kdf, &envelope, passphrase.as_bytes());
        drop(passphrase);
        let der = der?;

        let private_key = PrivateKey::from_pkcs8_der(&der)?;
        tracing::debug!("Loaded {}-bit private key from {}", private_key.bits(), path.display());
        Ok(private_key)
    }

    /// Read a public key file
    ///
    /// ## Errors
    ///
    /// - `IoFailed` if the file cannot be read
    /// - `InvalidFormat` if it is not a `PUBLIC KEY` block
    /// - `SerializationFailed` / `WrongKeyType` if the key is unusable
    pub fn load_public(&self, path: impl AsRef<Path>) -> Result<PublicKey> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(io_error(path))?;
        let der = pem::decode_labeled(&contents, PUBLIC_KEY_LABEL)?;

        let public_key = PublicKey::from_der(&der)?;
        tracing::debug!("Loaded {}-bit public key from {}", public_key.bits(), path.display());
        Ok(public_key)
    }

    /// Where `save_to_dir` puts the private key
    pub fn private_key_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(&self.config.private_key_file)
    }

    /// Where `save_to_dir` puts the public key
    pub fn public_key_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(&self.config.public_key_file)
    }

    /// Save `key_pair` under `dir` using the configured file names,
    /// creating the directory if needed
    pub fn save_to_dir(
        &self,
        key_pair: &KeyPair,
        dir: impl AsRef<Path>,
        passphrase: Passphrase,
    ) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(io_error(dir))?;

        self.save(
            key_pair,
            self.private_key_path(dir),
            self.public_key_path(dir),
            passphrase,
        )
    }
}

// ============================================================================
// DEFAULT-CONFIGURATION SHORTCUTS
// ============================================================================

/// Generate a key pair of `bits` bits
pub fn generate(bits: usize) -> Result<KeyPair> {
    KeyPair::generate(bits)
}

/// [`KeyStore::save`] with the default configuration
pub fn save(
    key_pair: &KeyPair,
    private_path: impl AsRef<Path>,
    public_path: impl AsRef<Path>,
    passphrase: Passphrase,
) -> Result<()> {
    KeyStore::default().save(key_pair, private_path, public_path, passphrase)
}

/// [`KeyStore::load_private`] with the default configuration
pub fn load_private(path: impl AsRef<Path>, passphrase: Passphrase) -> Result<PrivateKey> {
    KeyStore::default().load_private(path, passphrase)
}

/// [`KeyStore::load_public`] with the default configuration
pub fn load_public(path: impl AsRef<Path>) -> Result<PublicKey> {
    KeyStore::default().load_public(path)
}

// ============================================================================
// FILE HELPERS
// ============================================================================

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |e| Error::IoFailed(format!("{}: {}", path.display(), e))
}

fn write_owner_only(path: &Path, contents: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(OWNER_ONLY_MODE);
    }

    let mut file = options.open(path).map_err(io_error(path))?;
    // The mode above only applies to newly created files.
    restrict_permissions(&file).map_err(io_error(path))?;
    file.write_all(contents.as_bytes()).map_err(io_error(path))?;
    file.sync_all().map_err(io_error(path))?;
    Ok(())
}

/// Stage every file next to its destination, then rename them all into place
fn write_atomically(files: &[(&Path, &str)]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());

    for &(path, contents) in files {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(parent).map_err(io_error(path))?;
        restrict_permissions(tmp.as_file()).map_err(io_error(path))?;
        tmp.write_all(contents.as_bytes()).map_err(io_error(path))?;
        tmp.as_file().sync_all().map_err(io_error(path))?;
        staged.push((tmp, path));
    }

    for (tmp, path) in staged {
        tmp.persist(path).map_err(|e| io_error(path)(e.error))?;
    }

    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(OWNER_ONLY_MODE))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> std::io::Result<()> {
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
