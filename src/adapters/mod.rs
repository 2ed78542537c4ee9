pub mod cipher;
pub mod env;
pub mod kms;
