use std::time::Duration;

use serde::Deserialize;

use crate::core::errors::DecryptError;
use crate::core::traits::env_source::EnvSource;

/// Variable holding a ready-to-use OAuth access token.
pub const ACCESS_TOKEN_VAR: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Token endpoint of the GCE / Cloud Run metadata server.
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the bearer token for Cloud KMS comes from.
#[derive(Debug, Clone)]
pub enum AccessTokenSource {
    /// A token supplied up front (e.g. `gcloud auth print-access-token`).
    Static(String),
    /// The default service account of the runtime, via the metadata server.
    MetadataServer,
}

/// Response body of the metadata token endpoint.
#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    token_type: String,
}

impl AccessTokenSource {
    /// Prefer an explicit token; fall back to the metadata server.
    pub fn from_env(env: &impl EnvSource) -> Self {
        match env.var(ACCESS_TOKEN_VAR) {
            Some(token) if !token.trim().is_empty() => Self::Static(token.trim().to_string()),
            _ => Self::MetadataServer,
        }
    }

    /// Resolve the token. Only the metadata server involves a request.
    pub async fn fetch(&self) -> Result<String, DecryptError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::MetadataServer => fetch_from_metadata_server().await,
        }
    }
}

async fn fetch_from_metadata_server() -> Result<String, DecryptError> {
    let client = reqwest::Client::builder()
        .timeout(METADATA_TIMEOUT)
        .build()
        .map_err(|e| DecryptError::new(format!("Failed to create HTTP client: {e}")))?;

    let resp = client
        .get(METADATA_TOKEN_URL)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| {
            DecryptError::new(format!(
                "No credentials: {ACCESS_TOKEN_VAR} is not set and the metadata server \
                 is unreachable ({e})"
            ))
        })?;

    if !resp.status().is_success() {
        return Err(DecryptError::new(format!(
            "Metadata server returned status {}",
            resp.status()
        )));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| DecryptError::new(format!("Failed to read metadata token: {e}")))?;
    parse_metadata_token(&body)
}

fn parse_metadata_token(body: &str) -> Result<String, DecryptError> {
    let token: MetadataToken = serde_json::from_str(body)
        .map_err(|e| DecryptError::new(format!("Invalid metadata token response: {e}")))?;

    if !token.token_type.eq_ignore_ascii_case("bearer") {
        return Err(DecryptError::new(format!(
            "Unexpected token type '{}' from metadata server",
            token.token_type
        )));
    }
    Ok(token.access_token)
}
