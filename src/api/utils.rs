//! API utility functions
//!
//! Stateless helpers for request parsing and building file responses.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use futures_util::Stream;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tokio_util::io::ReaderStream;

use crate::api::error::ApiError;
use crate::workspace::{Artifact, Workspace};

/// Parses and validates Content-Type header for application/json
///
/// Accepts `application/json` with optional parameters; rejects
/// `application/jsonp`, `text/json` and malformed values.
pub fn parse_content_type(content_type: &str) -> Result<mime::Mime, ApiError> {
    let media_type: mime::Mime = content_type.parse().map_err(|_| {
        ApiError::InvalidPayload(format!("invalid Content-Type: {content_type}"))
    })?;

    if media_type.type_() != mime::APPLICATION || media_type.subtype() != mime::JSON {
        return Err(ApiError::InvalidPayload(format!(
            "Content-Type must be application/json, got: {}/{}",
            media_type.type_(),
            media_type.subtype()
        )));
    }

    Ok(media_type)
}

/// Reads the whole request body, refusing anything over `limit` bytes
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            Err(ApiError::PayloadTooLarge(limit))
        }
        Err(err) => Err(ApiError::InvalidPayload(format!(
            "failed to read request body: {err}"
        ))),
    }
}

/// `Content-Disposition` for an attachment. Names that are not plain ASCII
/// also get an RFC 5987 `filename*` parameter.
pub fn content_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();

    let value = if fallback == filename {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    };

    // Only printable ASCII reaches this point.
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Body stream that keeps the request's workspace alive until the client has
/// the last byte (or goes away); dropping it removes the workspace.
struct WorkspaceStream<S> {
    inner: S,
    _workspace: Workspace,
}

impl<S: Stream + Unpin> Stream for WorkspaceStream<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Stream `artifact` back as an attachment, handing the workspace to the body
pub async fn artifact_response(workspace: Workspace, artifact: Artifact) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(&artifact.path)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to open artifact: {e}")))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("failed to stat artifact: {e}")))?
        .len();

    let stream = WorkspaceStream {
        inner: ReaderStream::new(file),
        _workspace: workspace,
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.mime_type)
        .header(header::CONTENT_LENGTH, length)
        .header(header::CONTENT_DISPOSITION, content_disposition(&artifact.filename))
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("failed to build response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_type_valid() {
        assert!(parse_content_type("application/json").is_ok());
        assert!(parse_content_type("application/json; charset=utf-8").is_ok());
        assert!(parse_content_type("application/json; charset=UTF-8").is_ok());
    }

    #[test]
    fn test_parse_content_type_invalid() {
        assert!(parse_content_type("application/jsonp").is_err());
        assert!(parse_content_type("text/json").is_err());
        assert!(parse_content_type("multipart/form-data").is_err());
        assert!(parse_content_type("invalid").is_err());
        assert!(parse_content_type("").is_err());
    }

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let bytes = read_body(Body::from("{\"url\":\"x\"}"), 64).await.unwrap();
        assert_eq!(&bytes[..], b"{\"url\":\"x\"}");
    }

    #[tokio::test]
    async fn test_read_body_too_large() {
        let result = read_body(Body::from(vec![b'a'; 100]), 99).await;
        match result {
            Err(ApiError::PayloadTooLarge(limit)) => assert_eq!(limit, 99),
            other => panic!("Expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("My Video.mp4"),
            "attachment; filename=\"My Video.mp4\""
        );
    }

    #[test]
    fn test_content_disposition_unicode() {
        let value = content_disposition("Café \"Live\".m4a");
        assert_eq!(
            value,
            "attachment; filename=\"Caf_ _Live_.m4a\"; filename*=UTF-8''Caf%C3%A9%20%22Live%22.m4a"
        );
    }
}
