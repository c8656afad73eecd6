//! Wire types for the HTTP API.
//!
//! `POST /api/download` accepts:
//!
//! ```json
//! { "url": "https://example.com/watch?id=1", "type": "single", "format": "video" }
//! ```
//!
//! `type` is `single` (default) or `playlist`; `format` is `video` (default)
//! or `audio`. Success is the file itself; failures are [`ErrorResponse`].

use serde::{Deserialize, Serialize};

use crate::observability::MetricsSnapshot;

/// Raw request body. Fields stay loose here; [`super::validation`] decides
/// what is acceptable so missing values produce our own error messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub downloader: DownloaderHealth,
    pub stats: MetricsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct DownloaderHealth {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
