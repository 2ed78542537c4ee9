pub mod decrypter;
pub mod env_source;
