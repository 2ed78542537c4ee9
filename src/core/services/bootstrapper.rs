use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::config::bootstrap_config::{BootstrapConfig, ConfigField, ENV_TOKEN};
use crate::core::errors::{BootstrapError, Result};
use crate::core::models::crypto_key_name::CryptoKeyName;
use crate::core::models::keychain::{BootstrapOutcome, ENCRYPTED_SUFFIX, PlannedFile, SkipReason};
use crate::core::services::keychain;
use crate::core::traits::decrypter::Decrypter;
use crate::core::traits::env_source::EnvSource;

/// Variable holding the active environment name.
pub const APP_ENV_VAR: &str = "APP_ENV";

/// Variable requesting that setup be skipped. Presence is all that counts.
pub const SKIP_SETUP_VAR: &str = "APP_SKIP_SETUP";

/// Primary output file. Its presence marks a completed bootstrap.
pub const PRIMARY_ENV_FILE: &str = ".env";

const DEFAULT_PROJECT: &str = "mathrix-education";
const DEFAULT_LOCATION: &str = "global";
const DEFAULT_KEY_RING: &str = "mathrix-drive-keyring";
const DEFAULT_CRYPTO_KEY: &str = "mathrix-drive-api-{env}";
const DEFAULT_SECRETS_DIR: &str = "environments/{env}";

/// Known secret files and their destination relative to the base path.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    (".env", ".env"),
    ("jwt_auth.json", "storage/keychain/jwt_auth.json"),
];

/// Restores the encrypted keychain of the active environment before the
/// application boots.
///
/// The run is all-or-nothing from the caller's point of view: either it is
/// skipped entirely, or every `.enc` file of the environment is decrypted
/// in order until one fails.
pub struct EnvironmentBootstrapper<E: EnvSource> {
    base_path: PathBuf,
    env: String,
    env_source: E,
    project: String,
    location: String,
    key_ring: String,
    crypto_key: String,
    secrets_dir: String,
    mappings: BTreeMap<String, String>,
}

impl<E: EnvSource> EnvironmentBootstrapper<E> {
    /// Record the base path and read the active environment name.
    pub fn new(base_path: impl Into<PathBuf>, env_source: E) -> Self {
        let env = env_source.var(APP_ENV_VAR).unwrap_or_default();
        Self {
            base_path: base_path.into(),
            env,
            env_source,
            project: DEFAULT_PROJECT.into(),
            location: DEFAULT_LOCATION.into(),
            key_ring: DEFAULT_KEY_RING.into(),
            crypto_key: DEFAULT_CRYPTO_KEY.into(),
            secrets_dir: DEFAULT_SECRETS_DIR.into(),
            mappings: DEFAULT_MAPPINGS
                .iter()
                .map(|(file, dest)| (file.to_string(), dest.to_string()))
                .collect(),
        }
    }

    /// Override the static defaults with whatever `config` provides.
    ///
    /// Templates are taken as stored so `{env}` is always filled with the
    /// active environment, never with the config's own `env`. Configured
    /// mappings are merged over the built-in ones.
    pub fn with_config(mut self, config: &BootstrapConfig) -> Self {
        let overrides = [
            (ConfigField::Project, &mut self.project),
            (ConfigField::Location, &mut self.location),
            (ConfigField::KeyRing, &mut self.key_ring),
            (ConfigField::CryptoKey, &mut self.crypto_key),
            (ConfigField::SecretsDir, &mut self.secrets_dir),
        ];
        for (field, slot) in overrides {
            if let Some(value) = config.raw_string(field) {
                *slot = value;
            }
        }
        if let Some(mappings) = config.mappings() {
            self.mappings.extend(mappings);
        }
        self
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Why this run would be a no-op, if it would be.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        if self.env_source.var(SKIP_SETUP_VAR).is_some() {
            Some(SkipReason::SkipRequested)
        } else if self.base_path.join(PRIMARY_ENV_FILE).exists() {
            Some(SkipReason::AlreadyBootstrapped)
        } else {
            None
        }
    }

    /// The key every file of this environment is decrypted with.
    pub fn key_name(&self) -> CryptoKeyName {
        CryptoKeyName {
            project: self.project.replace(ENV_TOKEN, &self.env),
            location: self.location.replace(ENV_TOKEN, &self.env),
            key_ring: self.key_ring.replace(ENV_TOKEN, &self.env),
            crypto_key: self.crypto_key.replace(ENV_TOKEN, &self.env),
        }
    }

    /// Directory holding the encrypted files of this environment.
    pub fn keychain_dir(&self) -> PathBuf {
        self.base_path
            .join(self.secrets_dir.replace(ENV_TOKEN, &self.env))
    }

    /// Discover the keychain and resolve every destination, without
    /// reading or decrypting anything.
    pub fn plan(&self) -> Result<Vec<PlannedFile>> {
        self.check_env()?;

        let encrypted = keychain::encrypted_files(&self.keychain_dir())?;
        Ok(encrypted
            .into_iter()
            .map(|source| {
                let destination = self.destination_for(&source);
                PlannedFile {
                    source,
                    destination,
                }
            })
            .collect())
    }

    /// Decrypt the keychain of the active environment unless the run is
    /// skipped. Stops at the first failure; files restored before it stay
    /// on disk.
    pub fn bootstrap(&self, decrypter: &impl Decrypter) -> Result<BootstrapOutcome> {
        if let Some(reason) = self.skip_reason() {
            return Ok(BootstrapOutcome::Skipped(reason));
        }

        let planned = self.plan()?;
        let key_name = self.key_name();

        for file in &planned {
            let ciphertext = std::fs::read(&file.source)?;
            let plaintext = decrypter.decrypt(&key_name, &ciphertext).map_err(|source| {
                BootstrapError::RemoteDecryptFailure {
                    file: file.source.clone(),
                    key_name: key_name.to_string(),
                    source,
                }
            })?;
            std::fs::write(&file.destination, plaintext).map_err(|source| {
                BootstrapError::DestinationWriteFailure {
                    path: file.destination.clone(),
                    source,
                }
            })?;
        }

        Ok(BootstrapOutcome::Completed { restored: planned })
    }

    /// Mapped files go under the base path; the rest are restored next to
    /// their encrypted copy.
    fn destination_for(&self, encrypted: &Path) -> PathBuf {
        let name = encrypted.file_name().unwrap_or_default();
        let plain_name = match name
            .as_encoded_bytes()
            .strip_suffix(ENCRYPTED_SUFFIX.as_bytes())
        {
            // SAFETY: the bytes were split right before an ASCII suffix.
            Some(stem) => unsafe { OsStr::from_encoded_bytes_unchecked(stem) },
            None => name,
        };
        let plain = encrypted.with_file_name(plain_name);

        let mapped = plain_name
            .to_str()
            .and_then(|file_key| self.mappings.get(file_key));
        match mapped {
            Some(mapped) => self.base_path.join(mapped),
            None => plain,
        }
    }

    /// The environment name ends up in paths and key names.
    fn check_env(&self) -> Result<()> {
        if self.env.is_empty() {
            return Err(BootstrapError::EnvironmentNotSet);
        }
        if self.env.contains(['/', '\\']) || self.env == "." || self.env == ".." {
            return Err(BootstrapError::InvalidEnvironmentName {
                name: self.env.clone(),
            });
        }
        Ok(())
    }
}
