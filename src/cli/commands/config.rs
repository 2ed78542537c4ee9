use serde_json::Value;

use crate::cli::GlobalArgs;
use crate::cli::output;
use crate::core::errors::{BootstrapError, Result};

use super::bootstrap_helpers;

/// Execute the `kms-bootstrap config <field>` command.
///
/// Strings are printed as-is, tables as JSON. Unknown or unset fields
/// print nothing.
pub fn execute(args: &GlobalArgs, field: &str) -> Result<()> {
    let config = bootstrap_helpers::load_config(args)?;

    match config.lookup(field) {
        Some(Value::String(s)) => println!("{s}"),
        Some(other) => {
            let json = serde_json::to_string_pretty(&other).map_err(|e| {
                BootstrapError::InvalidConfig {
                    detail: format!("Cannot display '{field}': {e}"),
                }
            })?;
            println!("{json}");
        }
        None => output::detail(&format!("'{field}' is not set")),
    }

    Ok(())
}
