use std::path::PathBuf;

/// All domain errors for the bootstrap step.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger. Every one of them is fatal: the
/// application must not start with an incomplete keychain.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(
        "Configuration file not found: {path}\n\n  \
         Check that the path passed to --config is correct and the file exists."
    )]
    ConfigNotFound { path: PathBuf },

    #[error(
        "Invalid configuration type: expected a mapping or a file path, got {found}\n\n  \
         The configuration must be a table of keys to values, e.g.\n    \
         project = \"my-project\"\n    \
         cryptoKey = \"api-{{env}}\""
    )]
    InvalidConfigType { found: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "No application environment set\n\n  \
         Set APP_ENV to the environment to bootstrap (e.g. APP_ENV=production),\n  \
         or set APP_SKIP_SETUP to skip decryption entirely."
    )]
    EnvironmentNotSet,

    #[error(
        "Invalid environment name '{name}'\n\n  \
         Environment names are used in paths and key names and must not\n  \
         contain path separators or be '.' or '..'."
    )]
    InvalidEnvironmentName { name: String },

    #[error(
        "Decryption of {file} failed with key {key_name}: {source}\n\n  \
         Solutions:\n    \
         → Check that the runtime service account may use the key (roles/cloudkms.cryptoKeyDecrypter)\n    \
         → Check that the file was encrypted with the key of this environment\n    \
         → Files restored before this one were left in place"
    )]
    RemoteDecryptFailure {
        file: PathBuf,
        key_name: String,
        #[source]
        source: DecryptError,
    },

    #[error(
        "Cannot write {path}: {source}\n\n  \
         Destination directories are not created automatically.\n  \
         Make sure the directory exists and is writable before bootstrapping."
    )]
    DestinationWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure reported by a decrypt backend for a single ciphertext.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct DecryptError {
    pub reason: String,
}

impl DecryptError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BootstrapError>;
