use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use super::{
    error::ApiError,
    models::{DownloadRequest, DownloaderHealth, HealthResponse},
    state::AppState,
    utils,
    validation::{DownloadJob, validate_request},
};
use crate::downloader::{DownloadKind, Invocation};
use crate::humanize::ByteSize;
use crate::workspace::{self, Artifact, Workspace};

/// Media download endpoint (POST /api/download)
///
/// ## Flow:
/// 1. Validate Content-Type, read the bounded body, parse and validate JSON
/// 2. Create a fresh workspace named after a new request id
/// 3. Run the external downloader into the workspace's media directory
/// 4. Resolve its output into one file (single item) or one zip (playlist)
/// 5. Stream the file back; the workspace is removed once the body is done
///
/// Nothing touches the filesystem until step 2, so rejected requests leave
/// no trace. Every error path drops the workspace before responding.
pub async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Result<Response, ApiError> {
    let job = match parse_request(&state, &headers, body).await {
        Ok(job) => job,
        Err(err) => {
            state.metrics.request_rejected();
            warn!(error = %err, "Rejected download request");
            return Err(err);
        }
    };

    let request_id = Uuid::now_v7();
    let span = info_span!(
        "download",
        %request_id,
        url = %job.url,
        kind = job.kind.as_str(),
        format = job.format.as_str(),
    );

    async move {
        state.metrics.download_started();

        let result = match fetch_artifact(&state, &job, request_id).await {
            Ok((workspace, artifact)) => utils::artifact_response(workspace, artifact).await,
            Err(err) => Err(err),
        };

        match &result {
            Ok(_) => state.metrics.download_succeeded(),
            Err(err) => {
                state.metrics.download_failed();
                warn!(error = %err, "Download request failed");
            }
        }
        result
    }
    .instrument(span)
    .await
}

async fn parse_request(
    state: &AppState,
    headers: &HeaderMap,
    body: axum::body::Body,
) -> Result<DownloadJob, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;
    utils::parse_content_type(content_type)?;

    let limit = state.config.server.max_payload_bytes.as_usize();
    let body_bytes = utils::read_body(body, limit).await?;

    let request: DownloadRequest = serde_json::from_slice(&body_bytes)?;
    Ok(validate_request(request)?)
}

/// Run the downloader and resolve its output. The returned workspace must
/// outlive the artifact, which lives inside it.
async fn fetch_artifact(
    state: &AppState,
    job: &DownloadJob,
    request_id: Uuid,
) -> Result<(Workspace, Artifact), ApiError> {
    let workspace = Workspace::create_with_id(&state.config.workspace.root, request_id).await?;
    let invocation = Invocation::new(job.url.as_str(), job.kind, job.format, &workspace.media_dir());

    state.downloader.run(&invocation).await?;

    let workspace_dir = workspace.path().to_path_buf();
    let media_dir = workspace.media_dir();
    let profile = invocation.profile;
    let kind = job.kind;

    let artifact = tokio::task::spawn_blocking(move || match kind {
        DownloadKind::Playlist => workspace::package_playlist(&workspace_dir, &media_dir),
        DownloadKind::Single => workspace::locate_single(&media_dir, &profile),
    })
    .await
    .map_err(|e| ApiError::Internal(format!("artifact resolution task failed: {e}")))??;

    let size = tokio::fs::metadata(&artifact.path)
        .await
        .map(|m| ByteSize(m.len()))
        .ok();
    info!(
        filename = %artifact.filename,
        mime = artifact.mime_type,
        size = size.map(|s| s.to_string()).unwrap_or_default(),
        "Artifact ready"
    );

    Ok((workspace, artifact))
}

/// Health check endpoint (GET /health)
///
/// Asks the downloader for its version; 503 when it cannot be run.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (version, error) = match state.downloader.version().await {
        Ok(version) => (Some(version), None),
        Err(err) => (None, Some(err.to_string())),
    };

    let healthy = version.is_some();
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        downloader: DownloaderHealth {
            name: state.downloader.name().to_string(),
            version,
            error,
        },
        stats: state.metrics.snapshot(),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
