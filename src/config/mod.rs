use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};

mod validation;

pub use validation::{validate_for_use, validate_url};

/// Config file used when no `--config` path is given, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Persisted connection settings.
///
/// Both fields are optional on disk; [`validate_for_use`] is the gate that
/// turns a `Configuration` into a usable URL/token pair. Keys this client does
/// not know about are carried through load/save untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Configuration {
    pub fn is_empty(&self) -> bool {
        self.api_url.is_none() && self.bearer_token.is_none() && self.extra.is_empty()
    }
}

/// Loads and saves the [`Configuration`] document.
///
/// Nothing is cached: every call goes back to the file so that changes made by
/// another invocation are seen immediately.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. A missing or unparseable file yields an empty configuration.
    pub fn load(&self) -> Result<Configuration> {
        debug!(path = %self.path.display(), "loading configuration");
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Configuration::default()),
            Err(source) => {
                return Err(ClientError::Storage {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "configuration file is not valid, treating it as empty"
                );
                Ok(Configuration::default())
            }
        }
    }

    /// Write the full document, replacing whatever was stored before.
    pub fn save(&self, config: &Configuration) -> Result<()> {
        let storage_err = |source| ClientError::Storage {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| storage_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        fs::write(&self.path, content).map_err(storage_err)?;

        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Validate and persist the API base URL, keeping every other field.
    pub fn set_api_url(&self, api_url: &str) -> Result<Configuration> {
        validate_url(api_url)?;
        let mut config = self.load()?;
        config.api_url = Some(api_url.to_string());
        self.save(&config)?;
        info!(api_url, "API URL configured");
        Ok(config)
    }

    /// Persist the bearer token, keeping every other field.
    pub fn set_bearer_token(&self, token: &str) -> Result<Configuration> {
        let mut config = self.load()?;
        config.bearer_token = Some(token.to_string());
        self.save(&config)?;
        info!("bearer token configured");
        Ok(config)
    }

    /// Load the document and check it is ready for an authenticated call.
    pub fn credentials(&self) -> Result<(String, String)> {
        validate_for_use(&self.load()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("config.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = store(&dir).load().unwrap();
        assert_eq!(config, Configuration::default());
        assert!(config.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load().unwrap(), Configuration::default());

        fs::write(store.path(), r#"{"api_url": 42}"#).unwrap();
        assert_eq!(store.load().unwrap(), Configuration::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let config = Configuration {
            api_url: Some("https://apim.example.com".to_string()),
            bearer_token: Some("secret-token".to_string()),
            extra: Map::new(),
        };

        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
        assert_eq!(store.load().unwrap(), store.load().unwrap());
    }

    #[test]
    fn test_save_writes_expected_keys() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.set_bearer_token("abc").unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "bearer_token": "abc" }));
    }

    #[test]
    fn test_setters_preserve_other_fields() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), r#"{"bearer_token": "t1", "org": "acme"}"#).unwrap();

        let config = store.set_api_url("https://apim.example.com").unwrap();
        assert_eq!(config.bearer_token.as_deref(), Some("t1"));
        assert_eq!(config.extra.get("org"), Some(&Value::from("acme")));
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn test_set_api_url_rejects_invalid_url() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let err = store.set_api_url("ftp://x.com").unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("nested/dir/config.json"));
        store.set_bearer_token("abc").unwrap();
        assert_eq!(store.load().unwrap().bearer_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_save_fails_when_path_is_a_directory() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        let err = store.save(&Configuration::default()).unwrap_err();
        assert!(matches!(err, ClientError::Storage { .. }));
    }

    #[test]
    fn test_credentials_requires_both_fields() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(matches!(
            store.credentials().unwrap_err(),
            ClientError::Configuration(_)
        ));

        store.set_api_url("https://apim.example.com").unwrap();
        store.set_bearer_token("tok").unwrap();
        assert_eq!(
            store.credentials().unwrap(),
            ("https://apim.example.com".to_string(), "tok".to_string())
        );
    }
}
