//! Configuration file support for almanac.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `ALMANAC_`, nested keys joined
//!    with `__`, e.g. `ALMANAC_SYNC__NAME_CONCURRENCY`; `ALMANAC_DATABASE_URL`
//!    is accepted as a shorthand for `database.url`)
//! 3. Config file (./almanac.toml, then ~/.config/almanac/config.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/almanac/almanac.db` on Linux
//! (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/almanac/almanac.db"  # optional, this is the default
//!
//! [esi]
//! base_url = "https://esi.evetech.net/latest"
//! component_name = "my-industry-tool"
//! contact = "ops@example.com"  # optional, sent in the User-Agent
//! requests_per_second = 20  # optional proactive pacing
//!
//! [sync]
//! group_concurrency = 10
//! name_concurrency = 10
//! name_page_size = 1000
//! ```

use std::path::PathBuf;

use almanac::esi::{DEFAULT_COMPONENT_NAME, ESI_BASE_URL};
use almanac::sync::{
    DEFAULT_GROUP_CONCURRENCY, DEFAULT_NAME_CONCURRENCY, DEFAULT_NAME_PAGE_SIZE, SyncOptions,
};
use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

const APP_NAME: &str = "almanac";

/// Shorthand environment variable for the database URL.
const DATABASE_URL_ENV: &str = "ALMANAC_DATABASE_URL";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// ESI client configuration.
    pub esi: EsiConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    /// Defaults to `sqlite://~/.local/state/almanac/almanac.db` if not specified.
    pub url: Option<String>,
}

/// ESI client configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EsiConfig {
    /// ESI base URL, including the version segment.
    pub base_url: String,
    /// Sent in the `User-Agent` so ESI can identify the caller.
    pub component_name: String,
    /// Email or URL ESI operators can use to reach the caller.
    pub contact: Option<String>,
    /// Proactive pacing in requests per second. Unset disables pacing.
    pub requests_per_second: Option<u32>,
}

impl Default for EsiConfig {
    fn default() -> Self {
        Self {
            base_url: ESI_BASE_URL.to_string(),
            component_name: DEFAULT_COMPONENT_NAME.to_string(),
            contact: None,
            requests_per_second: None,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Market groups fetched concurrently per round.
    pub group_concurrency: usize,
    /// Name pages fetched concurrently per round.
    pub name_concurrency: usize,
    /// Ids per name lookup (at most 1000).
    pub name_page_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            group_concurrency: DEFAULT_GROUP_CONCURRENCY,
            name_concurrency: DEFAULT_NAME_CONCURRENCY,
            name_page_size: DEFAULT_NAME_PAGE_SIZE,
        }
    }
}

impl SyncConfig {
    pub fn to_options(&self) -> SyncOptions {
        SyncOptions {
            group_concurrency: self.group_concurrency,
            name_concurrency: self.name_concurrency,
            name_page_size: self.name_page_size,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/almanac/config.toml)
    /// 3. Local config file (./almanac.toml)
    /// 4. Environment variables with ALMANAC_ prefix
    ///
    /// Any failure falls back to the defaults with a warning.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}", e);
                Config::default()
            }
        }
    }

    fn try_load() -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("almanac.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./almanac.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., ALMANAC_SYNC__NAME_PAGE_SIZE -> sync.name_page_size
        builder = builder
            .add_source(
                Environment::with_prefix("ALMANAC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var(DATABASE_URL_ENV).ok())?;

        builder.build()?.try_deserialize::<Config>()
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter enables read-write access and creates the file
    /// if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("almanac.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/almanac` or `~/.local/state/almanac`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
