use crate::core::errors::DecryptError;
use crate::core::models::crypto_key_name::CryptoKeyName;

/// Port for the remote decrypt capability.
///
/// Implementations live in `adapters` (e.g. GcpKmsBackend, AgeBackend).
/// The bootstrapper only depends on this trait, never on a concrete backend.
pub trait Decrypter: Send + Sync {
    /// Decrypt `ciphertext` with the key identified by `key`.
    fn decrypt(&self, key: &CryptoKeyName, ciphertext: &[u8]) -> Result<Vec<u8>, DecryptError>;

    /// Human-readable name of this backend (e.g. "kms", "age").
    fn name(&self) -> &str;
}
