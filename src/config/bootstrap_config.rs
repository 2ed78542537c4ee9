use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::core::errors::{BootstrapError, Result};

/// Token replaced by the environment name when a string field is read.
pub const ENV_TOKEN: &str = "{env}";

/// The closed set of readable configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    BasePath,
    Env,
    SecretsDir,
    Project,
    Location,
    KeyRing,
    CryptoKey,
    Mappings,
}

impl ConfigField {
    pub const ALL: [Self; 8] = [
        Self::BasePath,
        Self::Env,
        Self::SecretsDir,
        Self::Project,
        Self::Location,
        Self::KeyRing,
        Self::CryptoKey,
        Self::Mappings,
    ];

    /// Key used in configuration files and inline mappings.
    pub fn key(self) -> &'static str {
        match self {
            Self::BasePath => "basePath",
            Self::Env => "env",
            Self::SecretsDir => "secretsDir",
            Self::Project => "project",
            Self::Location => "location",
            Self::KeyRing => "keyRing",
            Self::CryptoKey => "cryptoKey",
            Self::Mappings => "mappings",
        }
    }
}

impl FromStr for ConfigField {
    type Err = ();

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == name)
            .ok_or(())
    }
}

/// Where configuration overrides come from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// An in-memory mapping, or a string naming a configuration file.
    Inline(Value),
    /// A TOML file, or JSON when the extension is `.json`.
    File(PathBuf),
}

impl From<Value> for ConfigSource {
    fn from(value: Value) -> Self {
        Self::Inline(value)
    }
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for ConfigSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

/// Read-only bootstrap configuration.
///
/// Built once from a base path plus overrides, then never mutated.
/// String fields are returned with `{env}` replaced by the current
/// `env` value on every read.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    internal: Map<String, Value>,
}

impl BootstrapConfig {
    /// Build a configuration from `base_path` and an override source.
    ///
    /// Overrides are merged shallowly on top of `basePath`, last write wins.
    pub fn new(base_path: &Path, source: impl Into<ConfigSource>) -> Result<Self> {
        let mut config = Self {
            internal: Map::new(),
        };
        config.internal.insert(
            ConfigField::BasePath.key().to_string(),
            Value::String(base_path.to_string_lossy().into_owned()),
        );

        let overrides = match source.into() {
            // A bare string is a path to a configuration file.
            ConfigSource::Inline(Value::String(path)) => Self::load_file(Path::new(&path))?,
            ConfigSource::Inline(value) => value,
            ConfigSource::File(path) => Self::load_file(&path)?,
        };
        config.merge(overrides)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file. Missing files are reported as such
    /// before any parsing happens.
    fn load_file(path: &Path) -> Result<Value> {
        if !path.exists() {
            return Err(BootstrapError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content).map_err(|e| BootstrapError::InvalidConfig {
                detail: format!("Failed to parse {}: {e}", path.display()),
            })
        } else {
            toml::from_str(&content).map_err(|e| BootstrapError::InvalidConfig {
                detail: format!("Failed to parse {}: {e}", path.display()),
            })
        }
    }

    fn merge(&mut self, overrides: Value) -> Result<()> {
        match overrides {
            Value::Object(map) => {
                self.internal.extend(map);
                Ok(())
            }
            other => Err(BootstrapError::InvalidConfigType {
                found: type_name(&other).to_string(),
            }),
        }
    }

    /// `mappings` must be a table of file names to relative destinations.
    fn validate(&self) -> Result<()> {
        let Some(mappings) = self.internal.get(ConfigField::Mappings.key()) else {
            return Ok(());
        };
        let Value::Object(entries) = mappings else {
            return Err(BootstrapError::InvalidConfig {
                detail: format!("'mappings' must be a table, got {}", type_name(mappings)),
            });
        };
        for (file, destination) in entries {
            let Some(destination) = destination.as_str() else {
                return Err(BootstrapError::InvalidConfig {
                    detail: format!("mapping for '{file}' must be a string"),
                });
            };
            let escapes = Path::new(destination)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if destination.is_empty() || escapes {
                return Err(BootstrapError::InvalidConfig {
                    detail: format!(
                        "mapping for '{file}' must be a path relative to the base path, got '{destination}'"
                    ),
                });
            }
        }
        Ok(())
    }

    /// Read a field, with `{env}` substituted into string values.
    pub fn get(&self, field: ConfigField) -> Option<Value> {
        let value = self.internal.get(field.key())?.clone();
        if field == ConfigField::Env {
            return Some(value);
        }

        match (value, self.raw_env()) {
            (Value::String(s), Some(env)) => Some(Value::String(s.replace(ENV_TOKEN, env))),
            (value, _) => Some(value),
        }
    }

    /// Read a field by name. Names outside the whitelist yield `None`.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        name.parse::<ConfigField>()
            .ok()
            .and_then(|field| self.get(field))
    }

    /// Read a field as a string, if it is one.
    pub fn string(&self, field: ConfigField) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The configured file name → destination table, if any.
    pub fn mappings(&self) -> Option<BTreeMap<String, String>> {
        let Value::Object(entries) = self.get(ConfigField::Mappings)? else {
            return None;
        };
        Some(
            entries
                .into_iter()
                .filter_map(|(file, dest)| match dest {
                    Value::String(dest) => Some((file, dest)),
                    _ => None,
                })
                .collect(),
        )
    }

    pub fn base_path(&self) -> Option<PathBuf> {
        self.string(ConfigField::BasePath).map(PathBuf::from)
    }

    /// Read a string field exactly as stored, `{env}` left in place.
    pub fn raw_string(&self, field: ConfigField) -> Option<String> {
        self.internal
            .get(field.key())
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// `env` straight from storage, never substituted into itself.
    fn raw_env(&self) -> Option<&str> {
        self.internal
            .get(ConfigField::Env.key())
            .and_then(Value::as_str)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inline(value: Value) -> BootstrapConfig {
        BootstrapConfig::new(Path::new("/srv/app"), value).unwrap()
    }

    #[test]
    fn base_path_is_recorded() {
        let config = inline(json!({}));
        assert_eq!(config.base_path(), Some(PathBuf::from("/srv/app")));
        assert_eq!(config.lookup("basePath"), Some(json!("/srv/app")));
    }

    #[test]
    fn string_fields_substitute_env_on_read() {
        let config = inline(json!({
            "env": "staging",
            "cryptoKey": "mathrix-drive-api-{env}",
            "secretsDir": "environments/{env}/{env}",
        }));
        assert_eq!(
            config.string(ConfigField::CryptoKey).as_deref(),
            Some("mathrix-drive-api-staging")
        );
        assert_eq!(
            config.string(ConfigField::SecretsDir).as_deref(),
            Some("environments/staging/staging")
        );
    }

    #[test]
    fn env_is_never_substituted_into_itself() {
        let config = inline(json!({ "env": "{env}-x" }));
        assert_eq!(config.get(ConfigField::Env), Some(json!("{env}-x")));
    }

    #[test]
    fn token_is_kept_without_env() {
        let config = inline(json!({ "cryptoKey": "api-{env}" }));
        assert_eq!(config.string(ConfigField::CryptoKey).as_deref(), Some("api-{env}"));
    }

    #[test]
    fn unknown_and_unset_names_yield_none() {
        let config = inline(json!({ "env": "prod", "secret": "value" }));
        assert_eq!(config.lookup("secret"), None);
        assert_eq!(config.lookup("does-not-exist"), None);
        assert_eq!(config.lookup("project"), None);
        assert_eq!(config.lookup("Project"), None);
    }

    #[test]
    fn overrides_replace_base_path() {
        let config = inline(json!({ "basePath": "/elsewhere" }));
        assert_eq!(config.base_path(), Some(PathBuf::from("/elsewhere")));
    }

    #[test]
    fn mappings_are_returned_unsubstituted() {
        let config = inline(json!({
            "env": "prod",
            "mappings": { "creds.json": "storage/{env}/creds.json" },
        }));
        let mappings = config.mappings().unwrap();
        assert_eq!(mappings["creds.json"], "storage/{env}/creds.json");
    }

    #[test]
    fn non_mapping_source_is_invalid_type() {
        for value in [json!(["a"]), json!(42), json!(true), Value::Null] {
            let result = BootstrapConfig::new(Path::new("/srv/app"), value);
            assert!(matches!(result, Err(BootstrapError::InvalidConfigType { .. })));
        }
    }

    #[test]
    fn string_source_is_a_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let result = BootstrapConfig::new(dir.path(), json!(missing.display().to_string()));
        assert!(matches!(result, Err(BootstrapError::ConfigNotFound { path }) if path == missing));

        let present = dir.path().join("bootstrap.toml");
        std::fs::write(&present, "keyRing = \"ring\"\n").unwrap();
        let config = BootstrapConfig::new(dir.path(), json!(present.display().to_string())).unwrap();
        assert_eq!(config.string(ConfigField::KeyRing).as_deref(), Some("ring"));
    }

    #[test]
    fn raw_string_keeps_env_token() {
        let config = inline(json!({ "env": "production", "cryptoKey": "api-{env}" }));
        assert_eq!(config.raw_string(ConfigField::CryptoKey).as_deref(), Some("api-{env}"));
        assert_eq!(config.string(ConfigField::CryptoKey).as_deref(), Some("api-production"));
    }

    #[test]
    fn mappings_outside_base_path_are_rejected() {
        for destination in ["/etc/passwd", "../outside.json", "storage/../../x", ""] {
            let result = BootstrapConfig::new(
                Path::new("/srv/app"),
                json!({ "mappings": { "creds.json": destination } }),
            );
            assert!(
                matches!(result, Err(BootstrapError::InvalidConfig { .. })),
                "{destination} should be rejected"
            );
        }
    }

    #[test]
    fn non_string_mapping_is_rejected() {
        let result = BootstrapConfig::new(
            Path::new("/srv/app"),
            json!({ "mappings": { ".env": 1 } }),
        );
        assert!(matches!(result, Err(BootstrapError::InvalidConfig { .. })));
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("bootstrap.toml");
        let result = BootstrapConfig::new(dir.path(), missing.as_path());
        assert!(matches!(result, Err(BootstrapError::ConfigNotFound { path }) if path == missing));
    }

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootstrap.toml");
        std::fs::write(
            &path,
            "env = \"staging\"\nproject = \"acme-{env}\"\n\n[mappings]\n\"jwt.json\" = \"keys/jwt.json\"\n",
        )
        .unwrap();

        let config = BootstrapConfig::new(dir.path(), path).unwrap();
        assert_eq!(config.string(ConfigField::Project).as_deref(), Some("acme-staging"));
        assert_eq!(config.mappings().unwrap()["jwt.json"], "keys/jwt.json");
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootstrap.json");
        std::fs::write(&path, r#"{"keyRing": "ring", "location": "europe-west1"}"#).unwrap();

        let config = BootstrapConfig::new(dir.path(), path).unwrap();
        assert_eq!(config.string(ConfigField::KeyRing).as_deref(), Some("ring"));
        assert_eq!(config.string(ConfigField::Location).as_deref(), Some("europe-west1"));
    }

    #[test]
    fn json_array_file_is_invalid_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootstrap.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let result = BootstrapConfig::new(dir.path(), path);
        assert!(matches!(result, Err(BootstrapError::InvalidConfigType { .. })));
    }

    #[test]
    fn malformed_file_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootstrap.toml");
        std::fs::write(&path, "project = ").unwrap();

        let result = BootstrapConfig::new(dir.path(), path);
        assert!(matches!(result, Err(BootstrapError::InvalidConfig { .. })));
    }
}
