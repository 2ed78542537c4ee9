use std::path::{Path, PathBuf};

use crate::core::errors::Result;
use crate::core::models::keychain::ENCRYPTED_SUFFIX;

/// List the encrypted files directly under `dir`, sorted by file name.
///
/// Dot-files are included, subdirectories are neither listed nor entered.
/// A missing directory is an empty keychain.
pub fn encrypted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        if entry
            .file_name()
            .to_string_lossy()
            .ends_with(ENCRYPTED_SUFFIX)
        {
            files.push(entry.path());
        }
    }

    // read_dir order is platform dependent
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
