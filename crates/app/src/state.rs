use std::time::Duration;
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "hush";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_BASE_URL: &str = "hush://share/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base of every share link; the public key goes in its `key` parameter
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Whether `--copy` and `--paste` may touch the system clipboard
    #[serde(default = "default_clipboard")]
    pub clipboard: bool,
    /// Default log level for stderr output
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Delay before a pasted payload is decrypted, in milliseconds
    #[serde(default = "default_decrypt_debounce_ms")]
    pub decrypt_debounce_ms: u64,
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("hardcoded URL must parse")
}

fn default_clipboard() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_decrypt_debounce_ms() -> u64 {
    150
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            clipboard: default_clipboard(),
            log_level: default_log_level(),
            decrypt_debounce_ms: default_decrypt_debounce_ms(),
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> Result<tracing::Level, StateError> {
        self.log_level
            .parse()
            .map_err(|_| StateError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn decrypt_debounce(&self) -> Duration {
        Duration::from_millis(self.decrypt_debounce_ms)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the hush directory (~/.hush)
    pub hush_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the hush directory path (custom or default ~/.hush)
    pub fn hush_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Write a config file into a new hush directory
    ///
    /// Only configuration is ever written; keys live and die with a session.
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let hush_dir = Self::hush_dir(custom_path)?;
        let config_path = hush_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&hush_dir)?;

        let config = config.unwrap_or_default();
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            hush_dir,
            config_path,
            config,
        })
    }

    /// Load state from the hush directory, falling back to defaults without a config file
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let hush_dir = Self::hush_dir(custom_path)?;
        let config_path = hush_dir.join(CONFIG_FILE_NAME);

        let config = if config_path.exists() {
            let config_toml = fs::read_to_string(&config_path)?;
            toml::from_str(&config_toml)?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            AppConfig::default()
        };

        Ok(Self {
            hush_dir,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("hush directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("invalid log level in config: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_config_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let state = AppState::load(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(state.config, AppConfig::default());
        assert_eq!(state.config_path, dir.path().join(CONFIG_FILE_NAME));
        assert!(!state.config_path.exists());
    }

    #[test]
    fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hush");
        let config = AppConfig {
            base_url: Url::parse("https://secrets.example.com/share").unwrap(),
            clipboard: false,
            log_level: "debug".to_string(),
            decrypt_debounce_ms: 0,
        };

        let state = AppState::init(Some(path.clone()), Some(config.clone())).unwrap();
        assert!(state.config_path.exists());

        let loaded = AppState::load(Some(path)).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.config.log_level().unwrap(), tracing::Level::DEBUG);
        assert_eq!(loaded.config.decrypt_debounce(), Duration::ZERO);
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        let path = Some(dir.path().to_path_buf());
        AppState::init(path.clone(), None).unwrap();
        assert!(matches!(
            AppState::init(path, None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "clipboard = false\n").unwrap();

        let state = AppState::load(Some(dir.path().to_path_buf())).unwrap();
        assert!(!state.config.clipboard);
        assert_eq!(state.config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(state.config.log_level, "warn");
        assert_eq!(state.config.decrypt_debounce_ms, 150);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "base_url = 12").unwrap();
        assert!(matches!(
            AppState::load(Some(dir.path().to_path_buf())),
            Err(StateError::TomlDe(_))
        ));
    }

    #[test]
    fn test_invalid_log_level() {
        let config = AppConfig {
            log_level: "loud".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.log_level(),
            Err(StateError::InvalidLogLevel(level)) if level == "loud"
        ));
    }
}
