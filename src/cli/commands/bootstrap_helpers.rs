use serde_json::json;

use crate::adapters::env::process_env::ProcessEnv;
use crate::cli::GlobalArgs;
use crate::cli::output;
use crate::config::bootstrap_config::BootstrapConfig;
use crate::core::errors::Result;
use crate::core::services::bootstrapper::EnvironmentBootstrapper;

/// Build the configuration from `--config`, or from the base path alone
/// when no file is given.
pub fn load_config(args: &GlobalArgs) -> Result<BootstrapConfig> {
    match &args.config {
        Some(path) => {
            output::detail(&format!("Config: {}", path.display()));
            BootstrapConfig::new(&args.base_path, path.as_path())
        }
        None => BootstrapConfig::new(&args.base_path, json!({})),
    }
}

/// Build a bootstrapper for the process environment, with any
/// configuration overrides applied.
pub fn bootstrapper(args: &GlobalArgs) -> Result<EnvironmentBootstrapper<ProcessEnv>> {
    let config = load_config(args)?;
    let base_path = config
        .base_path()
        .unwrap_or_else(|| args.base_path.clone());

    Ok(EnvironmentBootstrapper::new(base_path, ProcessEnv).with_config(&config))
}
