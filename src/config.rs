//*** START FILE: src/config.rs ***//
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Error, Result};
use crate::session::DEFAULT_SAMPLE_SIZE;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_OWNER_PASSWORD: &str = "admin123";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the corpus and progress files live
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    /// Sentences drawn per session
    pub sample_size: usize,
    pub owner_password: String,
    /// `tracing_subscriber::EnvFilter` directive, overridden by RUST_LOG
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            export_dir: PathBuf::from("."),
            sample_size: DEFAULT_SAMPLE_SIZE,
            owner_password: DEFAULT_OWNER_PASSWORD.to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(Error::Config("sample_size must be at least 1".to_string()));
        }
        if self.owner_password.is_empty() {
            return Err(Error::Config("owner_password must not be empty".to_string()));
        }
        Ok(())
    }
}

/// `~/.local/share/translation-ranker` or the platform equivalent.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("translation-ranker"))
        .unwrap_or_else(|| PathBuf::from("./translation_ranker_data"))
}

pub fn load_config_from_file(file_path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(file_path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", file_path.display(), e)))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", file_path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Loads `file_path`, falling back to defaults when the file does not exist.
/// A file that exists but does not parse is still an error.
pub fn load_config_or_default(file_path: &Path) -> Result<Config> {
    if file_path.exists() {
        load_config_from_file(file_path)
    } else {
        warn!("{} not found, using default configuration", file_path.display());
        Ok(Config::default())
    }
}

//*** END FILE: src/config.rs ***//
