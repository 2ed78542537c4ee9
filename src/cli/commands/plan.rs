use colored::Colorize;

use crate::cli::GlobalArgs;
use crate::cli::output;
use crate::core::errors::Result;

use super::bootstrap_helpers;

/// Execute the `kms-bootstrap plan` command.
///
/// Lists the keychain of the active environment and the destination of
/// every file, without reading, decrypting or writing anything.
pub fn execute(args: &GlobalArgs) -> Result<()> {
    let bootstrapper = bootstrap_helpers::bootstrapper(args)?;
    let planned = bootstrapper.plan()?;

    output::header(&format!("Bootstrap plan for {}", bootstrapper.env()));
    output::line(&format!(
        "  Keychain: {}",
        bootstrapper.keychain_dir().display().to_string().cyan()
    ));
    output::line(&format!("  Key: {}", bootstrapper.key_name().to_string().cyan()));

    if let Some(reason) = bootstrapper.skip_reason() {
        output::warning(&format!("'run' would do nothing: {reason}"));
    }

    if planned.is_empty() {
        output::warning("No encrypted files found");
        return Ok(());
    }

    output::line("");
    for file in &planned {
        output::line(&format!(
            "  {} → {}",
            file.source.display(),
            file.destination.display().to_string().green()
        ));
    }

    Ok(())
}
