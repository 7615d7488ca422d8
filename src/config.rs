//! Configuration loaded from `config.toml` in the user's config directory,
//! with environment variable overrides.

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_API_URL: &str = "HIFZ_API_URL";
pub const ENV_API_TOKEN: &str = "HIFZ_API_TOKEN";
pub const ENV_USER_ID: &str = "HIFZ_USER_ID";
pub const ENV_DB_PATH: &str = "HIFZ_DB_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Couldn't find {0} directory")]
    MissingDirectory(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    /// Local database file; defaults to `<data dir>/hifz/hifz.sqlite3`
    pub database_path: Option<PathBuf>,
    /// User whose memorizations are revised
    pub user_id: Option<String>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hifz").join("config.toml"))
    }

    /// Loads the configuration and applies environment overrides.
    ///
    /// An explicit `path` must exist. Without one, a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Overrides file settings with non-empty values from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(url) = non_empty(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(token) = non_empty(ENV_API_TOKEN) {
            self.api.token = Some(token);
        }
        if let Some(user_id) = non_empty(ENV_USER_ID) {
            self.user_id = Some(user_id);
        }
        if let Some(path) = non_empty(ENV_DB_PATH) {
            self.database_path = Some(PathBuf::from(path));
        }
    }

    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join("hifz").join("hifz.sqlite3"))
                .ok_or(ConfigError::MissingDirectory("data")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.token, None);
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml_str(
            r#"
user_id = "u42"

[api]
base_url = "https://quran.example.com"
"#,
        )
        .unwrap();

        assert_eq!(config.user_id.as_deref(), Some("u42"));
        assert_eq!(config.api.base_url, "https://quran.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn test_invalid_file() {
        assert!(matches!(
            Config::from_toml_str("[api]\ntimeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_URL, "https://env.example.com"),
            (ENV_API_TOKEN, "tok"),
            (ENV_USER_ID, ""),
            (ENV_DB_PATH, "/tmp/hifz.sqlite3"),
        ]);
        let mut config = Config {
            user_id: Some("from-file".to_string()),
            ..Default::default()
        };
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://env.example.com");
        assert_eq!(config.api.token.as_deref(), Some("tok"));
        // empty values don't override
        assert_eq!(config.user_id.as_deref(), Some("from-file"));
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/hifz.sqlite3")
        );
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "database_path = \"local.sqlite3\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("local.sqlite3")));
    }
}
