//! `viability.toml` configuration.
//!
//! Every key is optional. Command-line flags win over the file, and the file
//! wins over built-in defaults.
//!
//! ```toml
//! locale = "en-AU"
//! store_key = "ndis-fail-safe-v2"
//!
//! [store]
//! backend = "sqlite"
//! connection_string = "viability.db"
//!
//! [rates]
//! level2 = 100.14
//! level3 = 190.41
//!
//! [report]
//! model = "gemini-2.5-flash"
//! api_key_env = "API_KEY"
//! timeout_secs = 60
//!
//! [logging]
//! level = "info"
//! file = "viability.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use viability_core::store::StoreConfig;
use viability_core::{DEFAULT_STORE_KEY, Locale, RateTable};

pub const DEFAULT_CONFIG_PATH: &str = "viability.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported locale '{0}' (expected en-AU, en-GB or en-US)")]
    InvalidLocale(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub locale: Option<String>,
    pub store_key: Option<String>,
    pub store: StoreSection,
    pub rates: RateTable,
    pub report: ReportSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            model: None,
            base_url: None,
            api_key_env: "API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

/// Values given on the command line; `None` defers to the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend: Option<String>,
    pub db: Option<String>,
    pub key: Option<String>,
    pub locale: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub store: StoreConfig,
    pub store_key: String,
    pub locale: Locale,
    pub rates: RateTable,
    pub report: ReportSettings,
    /// `None` leaves `RUST_LOG` (or the INFO default) in charge.
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key_env: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_toml(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, or `viability.toml` when `path` is `None`.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_toml(&text, &path),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    pub fn resolve(
        self,
        overrides: Overrides,
    ) -> Result<Settings, ConfigError> {
        let locale_tag = overrides.locale.or(self.locale);
        let locale = match locale_tag {
            Some(tag) => Locale::parse(&tag).ok_or(ConfigError::InvalidLocale(tag))?,
            None => Locale::default(),
        };

        let default_store = StoreConfig::default();
        let store = StoreConfig {
            backend: overrides
                .backend
                .or(self.store.backend)
                .unwrap_or(default_store.backend),
            connection_string: overrides
                .db
                .or(self.store.connection_string)
                .unwrap_or(default_store.connection_string),
        };

        Ok(Settings {
            store,
            store_key: overrides
                .key
                .or(self.store_key)
                .unwrap_or_else(|| DEFAULT_STORE_KEY.to_string()),
            locale,
            rates: self.rates,
            report: ReportSettings {
                model: self.report.model,
                base_url: self.report.base_url,
                api_key_env: self.report.api_key_env,
                timeout: Duration::from_secs(self.report.timeout_secs),
            },
            log_level: overrides.log_level.or(self.logging.level),
            log_file: overrides.log_file.or(self.logging.file),
        })
    }
}
