//! External downloader integration
//!
//! All knowledge of the command-line tool lives behind [`Downloader`]:
//! the HTTP layer only builds an [`Invocation`] and checks the outcome.
//!
//! - [`Invocation`] - resolved arguments for one run
//! - [`YtDlp`] - subprocess implementation for yt-dlp
//! - [`DownloadError`] - spawn, exit status, and timeout failures

mod plan;
mod ytdlp;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use plan::{DownloadKind, FormatProfile, Invocation, MediaFormat};
pub use ytdlp::YtDlp;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to start downloader: {0}")]
    Spawn(#[source] std::io::Error),

    /// `code` is `None` when the process was killed by a signal
    #[error("downloader exited with code {code:?}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("downloader did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("i/o error while waiting for downloader: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured output of a successful run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the request handler and the external tool
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Short name used in logs and health output
    fn name(&self) -> &str;

    /// Run one invocation to completion. A non-zero exit is an error.
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, DownloadError>;

    /// Version string reported by the tool
    async fn version(&self) -> Result<String, DownloadError>;
}
