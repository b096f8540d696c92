mod auth;
mod gateway;
mod links;
mod observability;

pub use auth::AuthConfig;
pub use gateway::GatewayConfig;
pub use links::{FetchConfig, ReaderConfig, default_user_agent};
pub use observability::ObservabilityConfig;

use crate::error::{ConfigError, ShelfError};
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = ".linkshelf";
const DATABASE_FILE_NAME: &str = "linkshelf.db";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// SQLite database file (default: <workspace>/linkshelf.db)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let linkshelf_dir = home.join(CONFIG_DIR_NAME);

        Self {
            workspace_dir: linkshelf_dir.join("workspace"),
            config_path: linkshelf_dir.join("config.toml"),
            database_path: None,
            reader: ReaderConfig::default(),
            fetch: FetchConfig::default(),
            gateway: GatewayConfig::default(),
            auth: AuthConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Load `~/.linkshelf/config.toml` (written with defaults on first run),
    /// apply environment overrides and validate the result.
    pub fn load() -> crate::Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_in(&home.join(CONFIG_DIR_NAME))
    }

    /// Same as [`Config::load`] rooted at an explicit directory.
    pub fn load_in(linkshelf_dir: &Path) -> crate::Result<Self> {
        let mut config = Self::load_or_init_in(linkshelf_dir)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read or create the config file without consulting the environment.
    pub fn load_or_init_in(linkshelf_dir: &Path) -> Result<Self> {
        let config_path = linkshelf_dir.join("config.toml");
        let workspace_dir = linkshelf_dir.join("workspace");

        if !workspace_dir.exists() {
            fs::create_dir_all(&workspace_dir)
                .context("Failed to create linkshelf workspace directory")?;
        }

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            // Set computed paths that are skipped during serialization
            config.config_path = config_path;
            config.workspace_dir = workspace_dir;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self {
                config_path,
                workspace_dir,
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let reader = url::Url::parse(&self.reader.base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "reader.base_url is not a URL ({e}): {}",
                self.reader.base_url
            ))
        })?;
        if !matches!(reader.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "reader.base_url must use http or https".into(),
            ));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "auth.token_ttl_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Resolved SQLite database location.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.workspace_dir.join(DATABASE_FILE_NAME))
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        // Workspace directory: LINKSHELF_WORKSPACE
        if let Ok(workspace) = std::env::var("LINKSHELF_WORKSPACE")
            && !workspace.is_empty()
        {
            self.workspace_dir = PathBuf::from(workspace);
        }

        // Database file: LINKSHELF_DATABASE
        if let Ok(database) = std::env::var("LINKSHELF_DATABASE")
            && !database.is_empty()
        {
            self.database_path = Some(PathBuf::from(database));
        }

        // Reader service: LINKSHELF_READER_URL
        if let Ok(reader) = std::env::var("LINKSHELF_READER_URL")
            && !reader.is_empty()
        {
            self.reader.base_url = reader;
        }

        // Gateway port: LINKSHELF_GATEWAY_PORT or PORT
        if let Ok(port_str) =
            std::env::var("LINKSHELF_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        // Gateway host: LINKSHELF_GATEWAY_HOST or HOST
        if let Ok(host) = std::env::var("LINKSHELF_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        // Log level: LINKSHELF_LOG
        if let Ok(level) = std::env::var("LINKSHELF_LOG")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
