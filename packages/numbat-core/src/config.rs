//! # Key Store Configuration
//!
//! Settings for where key files live, how large generated keys are, and how
//! hard the passphrase KDF works. Every field has a default, so an empty
//! TOML file is a valid configuration.
//!
//! ```toml
//! key_bits = 3072
//! atomic_writes = true
//! private_key_file = "id_numbat"
//! public_key_file = "id_numbat.pub"
//!
//! [kdf]
//! time_cost = 1
//! memory_kib = 65536
//! lanes = 4
//! output_len = 32
//! ```
//!
//! Key files written with non-default `[kdf]` settings can only be read back
//! with the same settings; nothing in the file records them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::{KdfParams, DEFAULT_KEY_BITS, MAX_KEY_BITS, MIN_KEY_BITS};
use crate::error::{Error, Result};

/// Default file name of the encrypted private key
pub const DEFAULT_PRIVATE_KEY_FILE: &str = "private_key.pem";

/// Default file name of the public key
pub const DEFAULT_PUBLIC_KEY_FILE: &str = "public_key.pem";

/// Configuration for a [`KeyStore`](crate::storage::KeyStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyStoreConfig {
    /// Modulus size for newly generated keys
    pub key_bits: usize,
    /// Passphrase KDF parameters
    pub kdf: KdfParams,
    /// Write key files through temporary files and rename them into place
    pub atomic_writes: bool,
    /// File name used by `save_to_dir` for the private key
    pub private_key_file: String,
    /// File name used by `save_to_dir` for the public key
    pub public_key_file: String,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_KEY_BITS,
            kdf: KdfParams::default(),
            atomic_writes: false,
            private_key_file: DEFAULT_PRIVATE_KEY_FILE.to_string(),
            public_key_file: DEFAULT_PUBLIC_KEY_FILE.to_string(),
        }
    }
}

impl KeyStoreConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Loading key store config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Check values that would otherwise only fail later, mid-operation
    pub fn validate(&self) -> Result<()> {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&self.key_bits) {
            return Err(Error::ConfigError(format!(
                "key_bits must be between {} and {}, got {}",
                MIN_KEY_BITS, MAX_KEY_BITS, self.key_bits
            )));
        }

        for (name, value) in [
            ("private_key_file", &self.private_key_file),
            ("public_key_file", &self.public_key_file),
        ] {
            if value.is_empty() {
                return Err(Error::ConfigError(format!("{} must not be empty", name)));
            }
        }

        if self.private_key_file == self.public_key_file {
            return Err(Error::ConfigError(
                "private_key_file and public_key_file must differ".into(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KeyStoreConfig::default();

        assert_eq!(config.key_bits, 2048);
        assert_eq!(config.kdf, KdfParams::default());
        assert!(!config.atomic_writes);
        assert_eq!(config.private_key_file, "private_key.pem");
        assert_eq!(config.public_key_file, "public_key.pem");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(KeyStoreConfig::from_toml_str("").unwrap(), KeyStoreConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = KeyStoreConfig::from_toml_str(
            r#"
            key_bits = 3072
            atomic_writes = true

            [kdf]
            memory_kib = 131072
            "#,
        )
        .unwrap();

        assert_eq!(config.key_bits, 3072);
        assert!(config.atomic_writes);
        assert_eq!(config.kdf.memory_kib, 131072);
        assert_eq!(config.kdf.time_cost, 1);
        assert_eq!(config.kdf.lanes, 4);
        assert_eq!(config.private_key_file, "private_key.pem");
    }

    #[test]
    fn test_key_bits_out_of_range() {
        let result = KeyStoreConfig::from_toml_str("key_bits = 512");
        assert!(matches!(result, Err(Error::ConfigError(_))));

        let result = KeyStoreConfig::from_toml_str("key_bits = 8192");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_same_file_names_rejected() {
        let result = KeyStoreConfig::from_toml_str(
            r#"
            private_key_file = "key.pem"
            public_key_file = "key.pem"
            "#,
        );
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = KeyStoreConfig::from_toml_str("keybits = 2048");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = KeyStoreConfig::from_toml_str("key_bits = ");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbat.toml");
        std::fs::write(&path, "atomic_writes = true\n").unwrap();

        let config = KeyStoreConfig::from_file(&path).unwrap();
        assert!(config.atomic_writes);

        let missing = KeyStoreConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::ConfigError(_))));
    }
}
