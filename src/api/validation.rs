use thiserror::Error;

use super::models::DownloadRequest;
use crate::downloader::{DownloadKind, MediaFormat};

const MAX_URL_LEN: usize = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("No URL provided")]
    MissingUrl,
    #[error("URL exceeds 4096 characters")]
    UrlTooLong,
    #[error("URL must not start with '-' or contain control characters")]
    InvalidUrl,
}

/// Request that passed validation and is ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub url: String,
    pub kind: DownloadKind,
    pub format: MediaFormat,
}

pub fn validate_request(request: DownloadRequest) -> Result<DownloadJob, RequestValidationError> {
    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(RequestValidationError::MissingUrl)?;

    if url.len() > MAX_URL_LEN {
        return Err(RequestValidationError::UrlTooLong);
    }

    // A leading dash would be read by the tool as an option.
    if url.starts_with('-') || url.chars().any(char::is_control) {
        return Err(RequestValidationError::InvalidUrl);
    }

    Ok(DownloadJob {
        url: url.to_string(),
        kind: DownloadKind::from_request(request.kind.as_deref()),
        format: MediaFormat::from_request(request.format.as_deref()),
    })
}
