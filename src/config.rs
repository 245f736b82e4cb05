//! TOML configuration.
//!
//! Every field has a default, so the file is optional and may be partial:
//!
//! ```toml
//! [clicker]
//! interval_ms = 250
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_INTERVAL_MS: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub clicker: ClickerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClickerConfig {
    /// Milliseconds between clicks.
    pub interval_ms: u64,
}

impl Default for ClickerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text)?;
        log::debug!("config: loaded {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.clicker.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "clicker.interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.clicker.interval_ms, DEFAULT_INTERVAL_MS);
    }

    #[test]
    fn interval_is_read() {
        let config = Config::parse("[clicker]\ninterval_ms = 250\n").unwrap();
        assert_eq!(config.clicker.interval_ms, 250);
    }

    #[test]
    fn zero_interval_is_invalid() {
        let err = Config::parse("[clicker]\ninterval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::parse("[clicker]\nbutton = \"right\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");

        let err = Config::parse("[hotkeys]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn negative_interval_is_a_parse_error() {
        let err = Config::parse("[clicker]\ninterval_ms = -5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load(Path::new("/nonexistent/autoclicker.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/autoclicker.toml"));
    }
}
