use crate::cli::GlobalArgs;
use crate::core::errors::{BootstrapError, Result};

use super::bootstrap_helpers;

/// Execute the `kms-bootstrap key-name` command.
///
/// Prints the bare key name so it can be fed to `gcloud kms encrypt --key`.
pub fn execute(args: &GlobalArgs) -> Result<()> {
    let bootstrapper = bootstrap_helpers::bootstrapper(args)?;
    if bootstrapper.env().is_empty() {
        return Err(BootstrapError::EnvironmentNotSet);
    }

    println!("{}", bootstrapper.key_name());
    Ok(())
}
