use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Upper bound for the JSON request body
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: ByteSize,
    /// Landing page served on `GET /`
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_payload_bytes: default_max_payload_bytes(),
            index_path: default_index_path(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_max_payload_bytes() -> ByteSize {
    ByteSize::kib(64)
}

fn default_index_path() -> PathBuf {
    PathBuf::from("templates/index.html")
}

/// Scratch workspace configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    /// Parent directory for per-request workspaces
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,
    /// Remove leftovers from a previous process on startup
    #[serde(default = "default_purge_on_start")]
    pub purge_on_start: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            purge_on_start: default_purge_on_start(),
        }
    }
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from("temp_downloads")
}

fn default_purge_on_start() -> bool {
    true
}

/// External downloader configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloaderConfig {
    /// Executable to spawn (`yt-dlp`, or e.g. `python3` together with `base_args`)
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments placed before the generated ones, e.g. `["-m", "yt_dlp"]`
    #[serde(default)]
    pub base_args: Vec<String>,
    /// Wall-clock limit for one invocation; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DownloaderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            base_args: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_program() -> String {
    "yt-dlp".to_string()
}

fn default_timeout_secs() -> u64 {
    30 * 60
}
