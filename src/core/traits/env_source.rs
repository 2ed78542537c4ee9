use std::collections::HashMap;

/// Port for reading process-wide environment variables.
///
/// `Some("")` means the variable is set to an empty value, which is
/// different from `None` (not set at all).
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
