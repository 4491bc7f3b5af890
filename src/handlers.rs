use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use tracing::debug;

use crate::AppState;
use crate::catalog::{self, FileEntry};
use crate::error::FileServerError;
use crate::page;
use crate::upload;

/// 302 to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Walk the root on the blocking pool.
async fn list_entries(state: &AppState) -> Result<Vec<FileEntry>, FileServerError> {
    let root = state.root.clone();
    let web_prefix = root.files_prefix();
    let show_hidden = state.config.show_hidden;

    tokio::task::spawn_blocking(move || catalog::list(&root, &web_prefix, show_hidden))
        .await
        .map_err(|err| FileServerError::Internal(err.to_string()))?
}

/// GET / - Redirect to the first root
pub async fn index_redirect(State(state): State<AppState>) -> Response {
    found(&state.root.view_prefix())
}

/// GET /<name> - Browse page
pub async fn view(State(state): State<AppState>) -> Result<Html<String>, FileServerError> {
    let entries = if state.config.downloads_enabled {
        list_entries(&state).await?
    } else {
        Vec::new()
    };

    Ok(Html(page::render(
        &state.root,
        &entries,
        state.config.uploads_enabled,
        state.config.downloads_enabled,
    )))
}

/// POST /<name>/upload - Store one file, then send the client back where it came from
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, FileServerError> {
    let multipart = multipart.map_err(|e| FileServerError::MalformedRequest(e.body_text()))?;

    let receipt = upload::accept(&state.root, multipart, state.config.max_upload_bytes).await?;
    debug!(
        "Upload to {} complete: {} bytes",
        state.root.name, receipt.bytes
    );

    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| state.root.view_prefix());

    Ok(found(&target))
}

/// GET /<name>/api/files - JSON listing
pub async fn api_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<FileEntry>>, FileServerError> {
    if !state.config.downloads_enabled {
        return Ok(Json(Vec::new()));
    }

    Ok(Json(list_entries(&state).await?))
}

/// Anything unmatched, including wrong methods on known paths
pub async fn not_found(uri: Uri) -> FileServerError {
    FileServerError::NotFound(uri.path().to_string())
}
