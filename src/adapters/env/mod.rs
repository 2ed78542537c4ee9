pub mod process_env;
