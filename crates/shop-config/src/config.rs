use std::{
    fs,
    path::PathBuf,
    sync::{LazyLock, RwLock},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{ConfigError, Result},
    path::{resolve_path, xdg_config_home, xdg_data_home},
};

/// Smallest page size the engine accepts.
pub const MIN_PAGE_LIMIT: i64 = 5;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Store configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Path to the SQLite database file.
    /// Default: $XDG_DATA_HOME/shop/shop.db
    pub db_path: Option<String>,

    /// How long a connection waits on a locked database, in milliseconds.
    /// Default: 5000
    pub busy_timeout_ms: Option<u64>,

    /// Time budget for one engine call, in milliseconds. 0 disables it.
    /// Default: 10000
    pub query_timeout_ms: Option<u64>,

    /// Page size for list requests that do not ask for one.
    /// Default: 10
    pub default_page_limit: Option<i64>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("SHOP_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("shop").join("config.toml"),
    })
});

pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG.write().unwrap();
    *global_config = Some(config);
    Ok(())
}

pub fn get_config() -> Config {
    {
        let config_guard = CONFIG.read().unwrap();
        if let Some(config) = config_guard.as_ref() {
            return config.clone();
        }
    }

    let mut config_guard = CONFIG.write().unwrap();
    config_guard.get_or_insert_with(Config::default_config).clone()
}

impl Config {
    /// Configuration with every default filled in.
    pub fn default_config() -> Self {
        let mut config = Self::default();
        config.fill_defaults();
        config
    }

    /// Loads the configuration file. A missing file yields the defaults.
    pub fn new() -> Result<Self> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
        Self::load(&config_path)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let mut config: Config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    fn fill_defaults(&mut self) {
        self.busy_timeout_ms.get_or_insert(DEFAULT_BUSY_TIMEOUT_MS);
        self.query_timeout_ms.get_or_insert(DEFAULT_QUERY_TIMEOUT_MS);
        self.default_page_limit.get_or_insert(DEFAULT_PAGE_LIMIT);
    }

    /// Validates the loaded values and fills in defaults.
    pub fn resolve(&mut self) -> Result<()> {
        if self.busy_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "busy_timeout_ms",
                reason: "must be greater than 0".to_string(),
            });
        }

        if let Some(limit) = self.default_page_limit {
            if limit < MIN_PAGE_LIMIT {
                return Err(ConfigError::InvalidValue {
                    field: "default_page_limit",
                    reason: format!("must be at least {MIN_PAGE_LIMIT}, got {limit}"),
                });
            }
        }

        if let Some(db_path) = &self.db_path {
            if db_path.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "db_path",
                    reason: "must not be empty".to_string(),
                });
            }
        }

        self.fill_defaults();

        Ok(())
    }

    /// `SHOP_DB`, then `db_path`, then `$XDG_DATA_HOME/shop/shop.db`.
    pub fn get_db_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("SHOP_DB") {
            return resolve_path(&env_path);
        }
        if let Some(db_path) = &self.db_path {
            return resolve_path(db_path);
        }
        Ok(xdg_data_home().join("shop").join("shop.db"))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS))
    }

    /// `None` when calls run without a deadline.
    pub fn query_timeout(&self) -> Option<Duration> {
        match self.query_timeout_ms.unwrap_or(DEFAULT_QUERY_TIMEOUT_MS) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn page_limit(&self) -> i64 {
        self.default_page_limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, serialized)?;
        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

pub fn generate_default_config() -> Result<()> {
    let config_path = CONFIG_PATH.read().unwrap().to_path_buf();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    Config::default_config().save()
}
