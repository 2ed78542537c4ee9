pub mod crypto_key_name;
pub mod keychain;
