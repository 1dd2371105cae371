use foodmenu_core::sync::DEFAULT_COLLECTION;
use foodmenu_core::{FirebaseCollection, SyncError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CURRENCY: &str = "$";
const DEFAULT_IDLE_TIMEOUT_MS: u64 = 2000;
const DEFAULT_FIRST_EVENT_TIMEOUT_MS: u64 = 10_000;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Realtime database URL (e.g. "https://my-app-default-rtdb.firebaseio.com")
    pub database_url: ConfigValue<Option<String>>,
    /// Collection holding the food records
    pub collection: ConfigValue<String>,
    /// Prefix shown before prices
    pub currency_symbol: ConfigValue<String>,
    /// How long one-shot commands wait for more events before reading the store
    pub idle_timeout_ms: ConfigValue<u64>,
    /// How long to wait for the collection's first answer; the idle window
    /// only starts once something has arrived
    pub first_event_timeout_ms: ConfigValue<u64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_url: Option<String>,
    collection: Option<String>,
    currency_symbol: Option<String>,
    idle_timeout_ms: Option<u64>,
    first_event_timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut database_url = ConfigValue::new(None, ConfigSource::Default);
        let mut collection =
            ConfigValue::new(DEFAULT_COLLECTION.to_string(), ConfigSource::Default);
        let mut currency_symbol =
            ConfigValue::new(DEFAULT_CURRENCY.to_string(), ConfigSource::Default);
        let mut idle_timeout_ms = ConfigValue::new(DEFAULT_IDLE_TIMEOUT_MS, ConfigSource::Default);
        let mut first_event_timeout_ms =
            ConfigValue::new(DEFAULT_FIRST_EVENT_TIMEOUT_MS, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.database_url {
                database_url = ConfigValue::new(Some(url), ConfigSource::File);
            }
            if let Some(name) = file_config.collection {
                collection = ConfigValue::new(name, ConfigSource::File);
            }
            if let Some(symbol) = file_config.currency_symbol {
                currency_symbol = ConfigValue::new(symbol, ConfigSource::File);
            }
            if let Some(ms) = file_config.idle_timeout_ms {
                idle_timeout_ms = ConfigValue::new(ms, ConfigSource::File);
            }
            if let Some(ms) = file_config.first_event_timeout_ms {
                first_event_timeout_ms = ConfigValue::new(ms, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(url) = std::env::var("FOODMENU_DATABASE_URL") {
            database_url = ConfigValue::new(Some(url), ConfigSource::Environment);
        }
        if let Ok(name) = std::env::var("FOODMENU_COLLECTION") {
            collection = ConfigValue::new(name, ConfigSource::Environment);
        }
        if let Ok(symbol) = std::env::var("FOODMENU_CURRENCY") {
            currency_symbol = ConfigValue::new(symbol, ConfigSource::Environment);
        }
        if let Some(ms) = env_millis("FOODMENU_IDLE_TIMEOUT_MS")? {
            idle_timeout_ms = ConfigValue::new(ms, ConfigSource::Environment);
        }
        if let Some(ms) = env_millis("FOODMENU_FIRST_EVENT_TIMEOUT_MS")? {
            first_event_timeout_ms = ConfigValue::new(ms, ConfigSource::Environment);
        }

        Ok(Self {
            database_url,
            collection,
            currency_symbol,
            idle_timeout_ms,
            first_event_timeout_ms,
            config_file,
        })
    }

    /// Builds the gateway for the configured collection.
    pub fn gateway(&self) -> Result<FirebaseCollection, SyncError> {
        match self.database_url.value.as_deref() {
            Some(url) if !url.trim().is_empty() => {
                Ok(FirebaseCollection::new(url.trim(), &self.collection.value))
            }
            _ => Err(SyncError::NotConfigured),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms.value)
    }

    pub fn first_event_timeout(&self) -> Duration {
        Duration::from_millis(self.first_event_timeout_ms.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/foodmenu/
    /// - macOS: ~/Library/Application Support/foodmenu/
    /// - Windows: %APPDATA%/foodmenu/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("foodmenu")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn env_millis(name: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw)),
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.database_url.value, None);
        assert_eq!(config.database_url.source, ConfigSource::Default);
        assert_eq!(config.collection.value, "food");
        assert_eq!(config.currency_symbol.value, "$");
        assert_eq!(config.idle_timeout(), Duration::from_millis(2000));
        assert_eq!(config.first_event_timeout(), Duration::from_secs(10));
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_url: https://menu-rtdb.firebaseio.com").unwrap();
        writeln!(file, "collection: lunch").unwrap();
        writeln!(file, "currency_symbol: \"€\"").unwrap();
        writeln!(file, "idle_timeout_ms: 500").unwrap();
        writeln!(file, "first_event_timeout_ms: 30000").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(
            config.database_url.value.as_deref(),
            Some("https://menu-rtdb.firebaseio.com")
        );
        assert_eq!(config.database_url.source, ConfigSource::File);
        assert_eq!(config.collection.value, "lunch");
        assert_eq!(config.currency_symbol.value, "€");
        assert_eq!(config.idle_timeout_ms.value, 500);
        assert_eq!(config.first_event_timeout_ms.value, 30000);
        assert_eq!(config.first_event_timeout_ms.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_partial_file_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "collection: dinner").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.collection.source, ConfigSource::File);
        assert_eq!(config.currency_symbol.source, ConfigSource::Default);
        assert_eq!(config.database_url.value, None);
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "collection: fromfile").unwrap();

        std::env::set_var("FOODMENU_COLLECTION", "fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.collection.value, "fromenv");
        assert_eq!(config.collection.source, ConfigSource::Environment);

        std::env::remove_var("FOODMENU_COLLECTION");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_gateway_requires_database_url() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_url: \"  \"").unwrap();
        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.gateway().unwrap_err(), SyncError::NotConfigured);

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_url: https://menu-rtdb.firebaseio.com").unwrap();
        writeln!(file, "collection: lunch").unwrap();
        let config = Config::load(Some(config_path)).unwrap();
        let gateway = config.gateway().unwrap();
        assert_eq!(gateway.database_url(), "https://menu-rtdb.firebaseio.com");
        assert_eq!(gateway.collection(), "lunch");
    }
}
