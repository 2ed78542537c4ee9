pub mod access_token;
pub mod gcp_kms_backend;
