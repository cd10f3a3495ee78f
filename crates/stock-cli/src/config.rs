//! Dashboard configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then environment
//! variables, then command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stock_dataset::{DataSource, DEFAULT_STALENESS};
use stock_query::completion::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use stock_query::InterpretationMode;

/// Environment variable holding the completion credential
pub(crate) const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable holding the sheet location
pub(crate) const SOURCE_VAR: &str = "STOCK_DATA_SOURCE";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// No sheet location anywhere in the layers
    #[error("no data source configured (use --source, STOCK_DATA_SOURCE or data_source in the config file)")]
    MissingSource,
}

/// Runtime settings for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DashboardConfig {
    /// CSV file path or HTTP(S) URL of the sheet
    #[serde(alias = "excel_path", alias = "sheet_url")]
    pub(crate) data_source: Option<String>,
    /// Completion service credential
    #[serde(alias = "OPENAI_API_KEY")]
    pub(crate) openai_api_key: Option<String>,
    /// Completion model name
    pub(crate) openai_model: String,
    /// Completion service base URL
    pub(crate) openai_base_url: String,
    /// Staleness window of the dataset cache, in seconds
    pub(crate) cache_ttl_secs: u64,
    /// Interpretation mode used when none is given on the command line
    pub(crate) mode: InterpretationMode,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_source: None,
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl_secs: DEFAULT_STALENESS.as_secs(),
            mode: InterpretationMode::Basic,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file
    pub(crate) fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub(crate) fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults, or the given file when present
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Override from the process environment
    #[must_use]
    pub(crate) fn with_env(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Override from an arbitrary variable lookup; blank values are ignored
    #[must_use]
    pub(crate) fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(key) = get(API_KEY_VAR) {
            self.openai_api_key = Some(key);
        }
        if let Some(source) = get(SOURCE_VAR) {
            self.data_source = Some(source);
        }
        self
    }

    /// Set data source
    #[must_use]
    pub(crate) fn with_data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = Some(source.into());
        self
    }

    /// Set staleness window
    #[must_use]
    pub(crate) fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Set default interpretation mode
    #[must_use]
    pub(crate) fn with_mode(mut self, mode: InterpretationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Staleness window as a duration
    #[must_use]
    pub(crate) fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Resolved sheet location
    pub(crate) fn source(&self) -> Result<DataSource, ConfigError> {
        self.data_source
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(DataSource::parse)
            .ok_or(ConfigError::MissingSource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.mode, InterpretationMode::Basic);
        assert!(matches!(config.source(), Err(ConfigError::MissingSource)));
    }

    #[test]
    fn toml_layer_with_legacy_keys() {
        let config = DashboardConfig::from_toml(
            r#"
            excel_path = "stock.csv"
            OPENAI_API_KEY = "sk-test"
            cache_ttl_secs = 5
            mode = "advanced"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_source.as_deref(), Some("stock.csv"));
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.mode, InterpretationMode::Advanced);
        assert_eq!(config.openai_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = DashboardConfig::from_toml("cache_ttl_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [(API_KEY_VAR, "sk-env"), (SOURCE_VAR, "https://x/y.csv")]
            .into_iter()
            .collect();
        let config = DashboardConfig::default()
            .with_data_source("local.csv")
            .with_env_lookup(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.openai_api_key.as_deref(), Some("sk-env"));
        assert_eq!(
            config.source().unwrap(),
            DataSource::Url("https://x/y.csv".to_string())
        );
    }

    #[test]
    fn blank_env_is_ignored() {
        let file = DashboardConfig {
            openai_api_key: Some("sk-file".to_string()),
            ..DashboardConfig::default()
        };
        let config = file.with_env_lookup(|_| Some("  ".to_string()));
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_source = \"inventario.csv\"").unwrap();

        let config = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config.source().unwrap(),
            DataSource::File(PathBuf::from("inventario.csv"))
        );
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = DashboardConfig::load(Some(Path::new("/nonexistent/stock.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
