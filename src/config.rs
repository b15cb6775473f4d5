//! Client configuration, loaded from `~/.factflow/config.toml` when present.
//!
//! CLI flags and `FACTFLOW_API_BASE` layer on top of the file; every field
//! has a default so the client runs with no config at all.

use crate::error::{Error, Result};
use crate::extract::DEFAULT_CONTENT_LIMIT;
use crate::store;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8050";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL.
    pub api_base: String,
    /// Truncation limit for extracted page text, in characters.
    pub content_limit: usize,
    /// Substitute a canned result when the analysis backend is unreachable.
    /// Development aid; never applies to real 4xx/5xx responses.
    pub mock_fallback: bool,
    /// Base delay per progress step during analysis.
    pub step_delay_ms: u64,
    /// Extra random delay added to each progress step.
    pub step_jitter_ms: u64,
    /// How often the signed-in profile is refreshed between REPL turns.
    pub user_refresh_secs: u64,
    /// How often community stats are refreshed between REPL turns.
    pub stats_refresh_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            content_limit: DEFAULT_CONTENT_LIMIT,
            mock_fallback: false,
            step_delay_ms: 800,
            step_jitter_ms: 400,
            user_refresh_secs: 60,
            stats_refresh_secs: 300,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        store::app_dir().join("config.toml")
    }

    /// Load the default config file, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.content_limit, 2000);
        assert!(!config.mock_fallback);
        assert_eq!(config.step_delay_ms, 800);
        assert_eq!(config.step_jitter_ms, 400);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base = \"https://api.factflow.example\"").unwrap();
        writeln!(file, "mock_fallback = true").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.api_base, "https://api.factflow.example");
        assert!(config.mock_fallback);
        assert_eq!(config.content_limit, 2000);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "content_limit = \"lots\"").unwrap();

        match Config::load_from(file.path()) {
            Err(Error::Config(msg)) => assert!(msg.contains("content_limit")),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
