use std::sync::Once;

use crate::core::traits::env_source::EnvSource;

/// Set so the Google client libraries of the application stay quiet about
/// end-user credentials. Unrelated to the bootstrap itself.
const SUPPRESS_WARNING_VAR: &str = "SUPPRESS_GCLOUD_CREDS_WARNING";

static SUPPRESS_WARNING: Once = Once::new();

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

/// Export `SUPPRESS_GCLOUD_CREDS_WARNING=true` for this process and its
/// children. Must run at the start of `main`, before any thread is spawned.
pub fn suppress_gcloud_credentials_warning() {
    SUPPRESS_WARNING.call_once(|| {
        // SAFETY: called from `main` while the process is still single-threaded.
        unsafe { std::env::set_var(SUPPRESS_WARNING_VAR, "true") };
    });
}
