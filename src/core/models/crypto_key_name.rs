/// Fully-qualified Cloud KMS crypto key identifier.
///
/// All files of one environment are decrypted with the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoKeyName {
    pub project: String,
    pub location: String,
    pub key_ring: String,
    pub crypto_key: String,
}

impl std::fmt::Display for CryptoKeyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/keyRings/{}/cryptoKeys/{}",
            self.project, self.location, self.key_ring, self.crypto_key
        )
    }
}
