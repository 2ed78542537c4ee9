pub mod bootstrap_config;
