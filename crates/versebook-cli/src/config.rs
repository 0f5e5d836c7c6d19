use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration for versebook.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (VERSEBOOK_* prefix, `.env` in the working
///    directory included)
/// 3. Config file (~/.config/versebook/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: VERSEBOOK_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/versebook/versebook.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Logger options, passed to twyg as-is.
    #[serde(default)]
    pub logging: twyg::Opts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the config file and environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `.env` or the config file exists but cannot be
    /// parsed.
    pub fn load() -> Result<Self> {
        load_dotenv()?;

        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("versebook");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration, letting `--db` override the database path.
    pub fn load_with_db_path(db_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load()?;
        if let Some(db_path) = db_path {
            config.database_path = db_path;
        }
        Ok(config)
    }
}

/// Read `.env` from the working directory into the process environment.
/// A missing file is not an error.
fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err).context("Failed to read .env file"),
    }
}

/// Returns: ~/.local/share/versebook/versebook.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("versebook")
        .join("versebook.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/versebook/config.toml
/// - macOS: ~/Library/Application Support/versebook/config.toml
/// - Windows: %APPDATA%\versebook\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("versebook")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Versebook Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (VERSEBOOK_* prefix; a .env file is read too)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database holding songs and lyrics
#
# Can also be set via:
# - CLI: versebook --db /custom/path.db list
# - Environment: VERSEBOOK_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/versebook.db"

# Logging
#[logging]
#level = "info"
#coloured = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
