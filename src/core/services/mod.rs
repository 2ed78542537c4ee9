pub mod bootstrapper;
pub mod keychain;
