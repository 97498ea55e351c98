// Configuration for readerchunks
//
// Layered: built-in defaults, then the optional TOML file, then environment
// variables, then command-line flags (applied by the caller).
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pdf_extraction::{ExtractionMethod, RemoteConfig};
use crate::types::{ReaderError, Result};

pub const APP_DIR: &str = "readerchunks";
pub const CONFIG_FILE: &str = "config.toml";

pub const ENV_BACKEND: &str = "READERCHUNKS_BACKEND";
pub const ENV_ENDPOINT: &str = "READERCHUNKS_ENDPOINT";
pub const ENV_API_KEY: &str = "READERCHUNKS_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub backend: ExtractionMethod,
    /// Populate the reader with substitute text when extraction fails.
    pub fallback: bool,
    pub search_dirs: Vec<PathBuf>,
    /// Where the native backend puts its temporary copies.
    pub scratch_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub remote: RemoteConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            backend: ExtractionMethod::Native,
            fallback: false,
            search_dirs: default_search_dirs(),
            scratch_dir: None,
            log_file: None,
            log_level: "info".to_string(),
            remote: RemoteConfig::default(),
        }
    }
}

fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs_found = vec![PathBuf::from(".")];
    dirs_found.extend(dirs::document_dir());
    dirs_found.extend(dirs::desktop_dir());
    dirs_found.extend(dirs::download_dir());
    dirs_found
}

/// `<config dir>/readerchunks/config.toml`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl ReaderConfig {
    /// Load from `path` (must exist) or from the default location (may be absent),
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content, path)
    }

    fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| ReaderError::Config {
            path: origin.display().to_string(),
            source,
        })
    }

    /// Environment lookups go through `lookup` so tests need not touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup(ENV_BACKEND) {
            self.backend = parse_backend(&backend)?;
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.remote.endpoint = Some(endpoint);
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.remote.api_key = Some(key);
        }
        Ok(())
    }

    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| ReaderError::InvalidSetting(format!("log level {:?}", self.log_level)))
    }
}

pub fn parse_backend(value: &str) -> Result<ExtractionMethod> {
    match value.trim().to_ascii_lowercase().as_str() {
        "native" => Ok(ExtractionMethod::Native),
        "remote" => Ok(ExtractionMethod::Remote),
        "demo" => Ok(ExtractionMethod::Demo),
        other => Err(ReaderError::InvalidSetting(format!("unknown backend {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn file_overrides_defaults() {
        let config = ReaderConfig::from_toml(
            r#"
            backend = "remote"
            fallback = true
            search_dirs = ["/srv/books"]

            [remote]
            endpoint = "https://extract.example.com/v1/pdf"
            timeout_secs = 15
            "#,
            Path::new("inline.toml"),
        )
        .unwrap();

        assert_eq!(config.backend, ExtractionMethod::Remote);
        assert!(config.fallback);
        assert_eq!(config.search_dirs, vec![PathBuf::from("/srv/books")]);
        assert_eq!(config.remote.timeout_secs, 15);
        assert_eq!(config.remote.api_key, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn bad_toml_names_the_file() {
        let err = ReaderConfig::from_toml("backend = [", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn env_wins_over_file() {
        let env: HashMap<&str, &str> = [
            (ENV_BACKEND, "Demo"),
            (ENV_API_KEY, "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = ReaderConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.backend, ExtractionMethod::Demo);
        assert_eq!(config.remote.api_key.as_deref(), Some("secret"));
        assert_eq!(config.remote.endpoint, None);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(parse_backend("ocr").is_err());
        let mut config = ReaderConfig::default();
        assert!(config.apply_env(|_| Some("ocr".to_string())).is_err());
    }

    #[test]
    fn log_level_parses() {
        let mut config = ReaderConfig::default();
        assert_eq!(config.level_filter().unwrap(), log::LevelFilter::Info);
        config.log_level = "chatty".to_string();
        assert!(config.level_filter().is_err());
    }
}
