use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;
use tracing::error;

use super::models::ErrorResponse;
use super::validation::RequestValidationError;
use crate::downloader::DownloadError;
use crate::workspace::WorkspaceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidPayload(String),
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),
    #[error("downloader failed")]
    DownloadFailed,
    #[error("downloader timed out")]
    TimedOut,
    #[error("playlist produced no files")]
    EmptyPlaylist,
    #[error("expected output file not found")]
    FileNotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::DownloadFailed
            | ApiError::TimedOut
            | ApiError::EmptyPlaylist
            | ApiError::FileNotFound
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client. Server-side detail never leaves the process.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::InvalidPayload(_) | ApiError::PayloadTooLarge(_) => self.to_string(),
            ApiError::DownloadFailed => {
                "Download failed. Check the server logs for downloader errors.".to_string()
            }
            ApiError::TimedOut => "Download timed out.".to_string(),
            ApiError::EmptyPlaylist => "Playlist download succeeded but no files were found \
                 (possibly restricted content)."
                .to_string(),
            ApiError::FileNotFound => "Video download succeeded but file not found \
                 (possibly restricted content or download failure)."
                .to_string(),
            ApiError::Internal(_) => "Internal server error.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if let ApiError::Internal(detail) = &self {
            error!(%detail, "Request failed with internal error");
        }

        let body = ErrorResponse {
            error: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidPayload(format!("invalid JSON body: {value}"))
    }
}

impl From<RequestValidationError> for ApiError {
    fn from(value: RequestValidationError) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

impl From<DownloadError> for ApiError {
    fn from(value: DownloadError) -> Self {
        match value {
            DownloadError::Failed { .. } => ApiError::DownloadFailed,
            DownloadError::TimedOut(_) => ApiError::TimedOut,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<WorkspaceError> for ApiError {
    fn from(value: WorkspaceError) -> Self {
        match value {
            WorkspaceError::EmptyPlaylist => ApiError::EmptyPlaylist,
            WorkspaceError::MissingFile(_) => ApiError::FileNotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ApiError::Internal("/srv/temp_downloads/abc: permission denied".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Internal server error.");
    }

    #[test]
    fn tool_failure_maps_to_generic_message() {
        let err = ApiError::from(DownloadError::TimedOut(std::time::Duration::from_secs(1)));
        assert!(matches!(err, ApiError::TimedOut));

        let err = ApiError::from(DownloadError::Spawn(std::io::Error::from(
            std::io::ErrorKind::NotFound,
        )));
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn payload_too_large_message() {
        let err = ApiError::PayloadTooLarge(65536);
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.client_message(), "payload too large: 65536 bytes");
    }

    #[test]
    fn resolution_errors_keep_their_kind() {
        assert!(matches!(
            ApiError::from(WorkspaceError::EmptyPlaylist),
            ApiError::EmptyPlaylist
        ));
        assert!(matches!(
            ApiError::from(WorkspaceError::MissingFile(".mp4")),
            ApiError::FileNotFound
        ));
    }

    #[test]
    fn missing_url_is_bad_request() {
        let err = ApiError::from(RequestValidationError::MissingUrl);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "No URL provided");
    }
}
