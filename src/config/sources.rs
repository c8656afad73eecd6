use super::models::Config;
use config::{ConfigError, Environment, File, FileFormat};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "MEDIAGRAB_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/mediagrab.toml";
const ENV_PREFIX: &str = "MEDIAGRAB";
const ENV_SEPARATOR: &str = "__";

/// Path of the TOML file: `MEDIAGRAB_CONFIG` or the default location
pub fn config_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration with priority (lowest first):
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Variables from a `.env` file (via dotenvy)
/// 4. Process environment
pub fn load() -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();
    load_from_sources(config_path())
}

/// Load configuration from a specific file plus the environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loading configuration file");
        builder = builder.add_source(File::from(config_path).format(FileFormat::Toml));
    } else {
        tracing::warn!(
            path = %config_path.display(),
            "Configuration file not found, using defaults and environment overrides"
        );
    }

    // MEDIAGRAB__DOWNLOADER__TIMEOUT_SECS -> downloader.timeout_secs
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .list_separator(" ")
            .with_list_parse_key("downloader.base_args")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
