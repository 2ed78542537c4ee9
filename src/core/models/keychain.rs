use std::path::PathBuf;

/// Suffix carried by every encrypted keychain file.
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// One encrypted keychain file and where its plaintext is restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Why a bootstrap run did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `APP_SKIP_SETUP` is present in the environment.
    SkipRequested,
    /// `<base>/.env` already exists from a previous run.
    AlreadyBootstrapped,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SkipRequested => write!(f, "APP_SKIP_SETUP is set"),
            Self::AlreadyBootstrapped => write!(f, ".env already exists"),
        }
    }
}

/// Result of a bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Skipped(SkipReason),
    Completed { restored: Vec<PlannedFile> },
}
