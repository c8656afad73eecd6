//! Configuration management for mediagrab
//!
//! Settings are layered, lowest priority first:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables
//!
//! # Usage
//!
//! ```no_run
//! use mediagrab::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `MEDIAGRAB__<section>__<key>`:
//! - `MEDIAGRAB__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `MEDIAGRAB__DOWNLOADER__PROGRAM=/usr/local/bin/yt-dlp`
//! - `MEDIAGRAB__DOWNLOADER__BASE_ARGS="-m yt_dlp"` (space separated)
//! - `MEDIAGRAB__WORKSPACE__ROOT=/var/tmp/mediagrab`
//!
//! # Configuration File
//!
//! Loaded from `config/mediagrab.toml` unless `MEDIAGRAB_CONFIG` points elsewhere.
//! A missing file is not an error.

mod models;
mod sources;
mod validation;

pub use models::{Config, DownloaderConfig, ServerConfig, WorkspaceConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
