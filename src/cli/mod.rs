pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::adapters::kms::gcp_kms_backend::DEFAULT_ENDPOINT;

/// Restore encrypted environment secrets with Cloud KMS before your application boots.
#[derive(Parser, Debug)]
#[command(name = "kms-bootstrap", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Application root containing `environments/` and receiving `.env`
    #[arg(long, global = true, default_value = ".")]
    pub base_path: PathBuf,

    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Decryption backend to use: kms or age
    #[arg(long, global = true, default_value = "kms")]
    pub cipher: String,

    /// age identity file (age backend only, default: ~/.config/age/keys.txt)
    #[arg(long, global = true)]
    pub identity: Option<PathBuf>,

    /// Cloud KMS endpoint
    #[arg(long, global = true, env = "CLOUDKMS_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub kms_endpoint: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decrypt the keychain of APP_ENV (no-op if .env exists or APP_SKIP_SETUP is set)
    Run,

    /// Show which files would be decrypted and where they would go
    Plan,

    /// Print the Cloud KMS key name for APP_ENV
    KeyName,

    /// Print a configuration field
    Config {
        /// Field name (basePath, env, secretsDir, project, location, keyRing, cryptoKey, mappings)
        field: String,
    },
}
