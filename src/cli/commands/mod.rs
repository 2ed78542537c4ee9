pub mod bootstrap_helpers;
pub mod config;
pub mod key_name;
pub mod plan;
pub mod run;
