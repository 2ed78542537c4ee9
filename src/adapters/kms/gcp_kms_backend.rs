use std::sync::Mutex;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::access_token::AccessTokenSource;
use crate::core::errors::DecryptError;
use crate::core::models::crypto_key_name::CryptoKeyName;
use crate::core::traits::decrypter::Decrypter;

/// Public Cloud KMS REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://cloudkms.googleapis.com";

/// Timeout for a single decrypt request.
const DECRYPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of `cryptoKeys.decrypt`.
#[derive(Debug, Serialize)]
struct DecryptRequest {
    ciphertext: String,
}

#[derive(Debug, Deserialize)]
struct DecryptResponse {
    #[serde(default)]
    plaintext: String,
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Google Cloud KMS backend using the REST `cryptoKeys.decrypt` method.
///
/// Construction never fails; credentials are resolved on the first
/// decrypt and reused for the rest of the batch.
pub struct GcpKmsBackend {
    endpoint: String,
    token_source: AccessTokenSource,
    token: Mutex<Option<String>>,
}

impl GcpKmsBackend {
    pub fn new(endpoint: impl Into<String>, token_source: AccessTokenSource) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token_source,
            token: Mutex::new(None),
        }
    }

    fn decrypt_url(&self, key: &CryptoKeyName) -> String {
        format!("{}/v1/{key}:decrypt", self.endpoint)
    }

    async fn access_token(&self) -> Result<String, DecryptError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }
        let token = self.token_source.fetch().await?;
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.clone());
        }
        Ok(token)
    }

    fn cached_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|slot| slot.clone())
    }

    async fn send_decrypt(
        &self,
        key: &CryptoKeyName,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, DecryptError> {
        let token = self.access_token().await?;
        let client = reqwest::Client::builder()
            .timeout(DECRYPT_TIMEOUT)
            .user_agent(format!("kms-bootstrap/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DecryptError::new(format!("Failed to create HTTP client: {e}")))?;

        let resp = client
            .post(self.decrypt_url(key))
            .bearer_auth(token)
            .json(&encode_request(ciphertext))
            .send()
            .await
            .map_err(|e| DecryptError::new(format!("Cloud KMS request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DecryptError::new(format!("Failed to read Cloud KMS response: {e}")))?;

        if !status.is_success() {
            return Err(describe_failure(status.as_u16(), &body));
        }
        decode_response(&body)
    }
}

impl Decrypter for GcpKmsBackend {
    fn decrypt(&self, key: &CryptoKeyName, ciphertext: &[u8]) -> Result<Vec<u8>, DecryptError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DecryptError::new(format!("Failed to create async runtime: {e}")))?;

        rt.block_on(self.send_decrypt(key, ciphertext))
    }

    fn name(&self) -> &str {
        "kms"
    }
}

fn encode_request(ciphertext: &[u8]) -> DecryptRequest {
    DecryptRequest {
        ciphertext: STANDARD.encode(ciphertext),
    }
}

fn decode_response(body: &str) -> Result<Vec<u8>, DecryptError> {
    let resp: DecryptResponse = serde_json::from_str(body)
        .map_err(|e| DecryptError::new(format!("Invalid Cloud KMS response: {e}")))?;
    STANDARD
        .decode(resp.plaintext)
        .map_err(|e| DecryptError::new(format!("Plaintext is not valid base64: {e}")))
}

fn describe_failure(status: u16, body: &str) -> DecryptError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => DecryptError::new(format!(
            "Cloud KMS returned {status} {}: {}",
            envelope.error.status, envelope.error.message
        )),
        _ => DecryptError::new(format!("Cloud KMS returned status {status}")),
    }
}
