mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    adapters::env::process_env::suppress_gcloud_credentials_warning();

    let args = Cli::parse();
    cli::context::init(args.global.verbose, args.global.quiet);

    let result = match &args.command {
        Commands::Run => cli::commands::run::execute(&args.global),
        Commands::Plan => cli::commands::plan::execute(&args.global),
        Commands::KeyName => cli::commands::key_name::execute(&args.global),
        Commands::Config { field } => cli::commands::config::execute(&args.global, field),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
