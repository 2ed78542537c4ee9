use std::path::PathBuf;

use crate::adapters::cipher::age_backend::AgeBackend;
use crate::adapters::env::process_env::ProcessEnv;
use crate::adapters::kms::access_token::AccessTokenSource;
use crate::adapters::kms::gcp_kms_backend::GcpKmsBackend;
use crate::cli::GlobalArgs;
use crate::cli::output;
use crate::core::errors::{BootstrapError, Result};
use crate::core::models::keychain::BootstrapOutcome;
use crate::core::services::bootstrapper::EnvironmentBootstrapper;
use crate::core::traits::decrypter::Decrypter;
use crate::core::traits::env_source::EnvSource;

use super::bootstrap_helpers;

/// Execute the `kms-bootstrap run` command.
///
/// Decrypts every `.enc` file of the active environment and writes the
/// plaintext to its destination. Does nothing when a previous run already
/// produced `.env` or when `APP_SKIP_SETUP` is set.
pub fn execute(args: &GlobalArgs) -> Result<()> {
    let bootstrapper = bootstrap_helpers::bootstrapper(args)?;

    // Check before touching any backend so a skipped run needs no credentials.
    if let Some(reason) = bootstrapper.skip_reason() {
        output::detail(&format!("Bootstrap skipped: {reason}"));
        return Ok(());
    }

    match args.cipher.as_str() {
        "kms" => {
            let token = AccessTokenSource::from_env(&ProcessEnv);
            let backend = GcpKmsBackend::new(&args.kms_endpoint, token);
            bootstrap_with(&bootstrapper, &backend)
        }
        "age" => {
            let identity_path = match &args.identity {
                Some(path) => path.clone(),
                None => AgeBackend::default_identity_path()?,
            };
            if !identity_path.exists() {
                return Err(BootstrapError::InvalidConfig {
                    detail: format!(
                        "No age identity found at {}\n\n  Use --identity <path> to specify the location.",
                        identity_path.display()
                    ),
                });
            }
            bootstrap_with(&bootstrapper, &AgeBackend::new(identity_path))
        }
        other => Err(BootstrapError::InvalidConfig {
            detail: format!("Unknown cipher backend: '{other}'. Use 'kms' or 'age'."),
        }),
    }
}

/// Run the bootstrap with a given backend and report what was restored.
fn bootstrap_with<E: EnvSource, D: Decrypter>(
    bootstrapper: &EnvironmentBootstrapper<E>,
    decrypter: &D,
) -> Result<()> {
    output::header(&format!(
        "Bootstrapping {} with {}",
        bootstrapper.env(),
        decrypter.name()
    ));
    let keychain_dir = bootstrapper.keychain_dir();
    output::detail(&format!("Keychain: {}", keychain_dir.display()));
    output::detail(&format!("Key: {}", bootstrapper.key_name()));

    match bootstrapper.bootstrap(decrypter)? {
        BootstrapOutcome::Skipped(reason) => {
            output::detail(&format!("Bootstrap skipped: {reason}"));
        }
        BootstrapOutcome::Completed { restored } if restored.is_empty() => {
            output::warning(&format!(
                "No encrypted files found in {}",
                keychain_dir.display()
            ));
        }
        BootstrapOutcome::Completed { restored } => {
            for file in &restored {
                output::detail(&format!("Decrypted {}", file.source.display()));
                output::success(&format!("Restored {}", relative(bootstrapper, &file.destination).display()));
            }
            output::success(&format!("{} secret file(s) restored", restored.len()));
        }
    }

    Ok(())
}

/// Show destinations relative to the base path when possible.
fn relative<E: EnvSource>(bootstrapper: &EnvironmentBootstrapper<E>, path: &std::path::Path) -> PathBuf {
    path.strip_prefix(bootstrapper.base_path())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|_| path.to_path_buf())
}
