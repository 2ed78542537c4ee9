use std::io::Read;
use std::path::PathBuf;

use crate::core::errors::{BootstrapError, DecryptError, Result};
use crate::core::models::crypto_key_name::CryptoKeyName;
use crate::core::traits::decrypter::Decrypter;

/// Offline backend decrypting `age` files with a local identity.
///
/// Useful for local development and CI where Cloud KMS is not reachable.
/// Accepts both ASCII-armored and binary ciphertext. age identities are not
/// addressed by name, so the crypto key name is ignored.
pub struct AgeBackend {
    /// Path to the age identity (private key) file.
    identity_path: PathBuf,
}

impl AgeBackend {
    /// Create a new backend pointing to a specific identity file.
    pub fn new(identity_path: PathBuf) -> Self {
        Self { identity_path }
    }

    /// Default identity file location for the current platform.
    ///
    /// - Linux/macOS: `~/.config/age/keys.txt`
    /// - Windows: `%APPDATA%/age/keys.txt`
    pub fn default_identity_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| BootstrapError::InvalidConfig {
            detail: "Could not determine config directory".into(),
        })?;
        Ok(config_dir.join("age").join("keys.txt"))
    }

    /// Load identities from the private key file.
    fn load_identities(&self) -> std::result::Result<Vec<Box<dyn age::Identity>>, DecryptError> {
        let path_str = self.identity_path.to_string_lossy().to_string();
        let identity_file = age::IdentityFile::from_file(path_str).map_err(|e| {
            DecryptError::new(format!(
                "Failed to read identity file '{}': {e}",
                self.identity_path.display()
            ))
        })?;

        let identities = identity_file
            .into_identities()
            .map_err(|e| DecryptError::new(format!("Invalid identity file: {e}")))?;

        Ok(identities
            .into_iter()
            .map(|identity| identity as Box<dyn age::Identity>)
            .collect())
    }
}

impl Decrypter for AgeBackend {
    fn decrypt(
        &self,
        _key: &CryptoKeyName,
        ciphertext: &[u8],
    ) -> std::result::Result<Vec<u8>, DecryptError> {
        let identities = self.load_identities()?;

        let armored_reader = age::armor::ArmoredReader::new(ciphertext);
        let decryptor = age::Decryptor::new(armored_reader)
            .map_err(|e| DecryptError::new(format!("Invalid encrypted file: {e}")))?;

        let mut reader = decryptor
            .decrypt(identities.iter().map(|i| i.as_ref()))
            .map_err(|_| DecryptError::new("no matching age identity for this file"))?;

        let mut plaintext = Vec::new();
        reader
            .read_to_end(&mut plaintext)
            .map_err(|e| DecryptError::new(format!("Read decrypted data failed: {e}")))?;

        Ok(plaintext)
    }

    fn name(&self) -> &str {
        "age"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use age::secrecy::ExposeSecret;

    fn key_name() -> CryptoKeyName {
        CryptoKeyName {
            project: "p".into(),
            location: "global".into(),
            key_ring: "r".into(),
            crypto_key: "k".into(),
        }
    }

    /// Write a fresh identity to `dir` and return its path and recipient.
    fn identity_in(dir: &std::path::Path, name: &str) -> (PathBuf, age::x25519::Recipient) {
        let identity = age::x25519::Identity::generate();
        let path = dir.join(name);
        std::fs::write(&path, format!("{}\n", identity.to_string().expose_secret())).unwrap();
        (path, identity.to_public())
    }

    #[test]
    fn decrypts_binary_ciphertext() {
        let dir = tempfile::tempdir().unwrap();
        let (path, recipient) = identity_in(dir.path(), "keys.txt");
        let ciphertext = age::encrypt(&recipient, b"APP_KEY=base64:abc").unwrap();

        let plaintext = AgeBackend::new(path).decrypt(&key_name(), &ciphertext).unwrap();

        assert_eq!(plaintext, b"APP_KEY=base64:abc");
    }

    #[test]
    fn decrypts_armored_ciphertext() {
        let dir = tempfile::tempdir().unwrap();
        let (path, recipient) = identity_in(dir.path(), "keys.txt");
        let ciphertext = age::encrypt_and_armor(&recipient, b"{\"secret\":1}").unwrap();

        let plaintext = AgeBackend::new(path)
            .decrypt(&key_name(), ciphertext.as_bytes())
            .unwrap();

        assert_eq!(plaintext, b"{\"secret\":1}");
    }

    #[test]
    fn wrong_identity_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (_, recipient) = identity_in(dir.path(), "key1.txt");
        let (other, _) = identity_in(dir.path(), "key2.txt");
        let ciphertext = age::encrypt(&recipient, b"secret").unwrap();

        let result = AgeBackend::new(other).decrypt(&key_name(), &ciphertext);

        assert!(result.is_err());
    }

    #[test]
    fn missing_identity_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let backend = AgeBackend::new(dir.path().join("missing.txt"));

        let err = backend.decrypt(&key_name(), b"garbage").unwrap_err();

        assert!(err.reason.contains("Failed to read identity file"));
    }
}
