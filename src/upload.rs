//! Streaming of a single multipart file part into a root.

use std::path::PathBuf;

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::FileServerError;
use crate::roots::NamedRoot;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Name prefix of in-flight uploads. The leading dot keeps them out of
/// listings unless hidden files are shown.
const STAGING_PREFIX: &str = ".rootshare-upload-";

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Persist the `file` part of `multipart` into `root`.
///
/// The body must already be capped at `limit` bytes by the caller's body
/// limit layer; `limit` is only used to report the failure. The part is
/// streamed into a staging file next to the destination and renamed over it
/// once complete, so an existing file is only replaced by a finished upload.
pub async fn accept(
    root: &NamedRoot,
    mut multipart: Multipart,
    limit: u64,
) -> Result<UploadReceipt, FileServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() == Some(FILE_FIELD) {
            return store_field(root, field, limit).await;
        }
        debug!("Ignoring multipart field {:?}", field.name());
    }

    Err(FileServerError::MalformedRequest(format!(
        "missing `{}` field",
        FILE_FIELD
    )))
}

async fn store_field(
    root: &NamedRoot,
    mut field: Field<'_>,
    limit: u64,
) -> Result<UploadReceipt, FileServerError> {
    let declared = field.file_name().unwrap_or_default().to_string();
    let file_name = sanitize_filename(&declared).ok_or_else(|| {
        warn!("Rejected upload filename {:?}", declared);
        FileServerError::InvalidFilename(declared.clone())
    })?;

    fs::create_dir_all(&root.path)
        .await
        .map_err(|source| FileServerError::StorageFailure {
            path: root.path.clone(),
            source,
        })?;

    let dest = root.path.join(&file_name);
    let storage = |source: std::io::Error| FileServerError::StorageFailure {
        path: dest.clone(),
        source,
    };

    // Dropping the staged path on any early return removes it, so a failed
    // transfer never touches `dest`.
    let (staged, staged_path) = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(&root.path)
        .map_err(storage)?
        .into_parts();
    let mut file = fs::File::from_std(staged);

    info!("Receiving upload for {}", dest.display());

    let mut bytes = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(|e| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => {
            warn!("Upload for {} exceeded {} bytes", dest.display(), limit);
            FileServerError::PayloadTooLarge { limit }
        }
        _ => storage(std::io::Error::other(e)),
    })? {
        bytes = bytes.saturating_add(chunk.len() as u64);
        file.write_all(&chunk).await.map_err(storage)?;
    }
    file.flush().await.map_err(storage)?;
    drop(file);

    staged_path
        .persist(&dest)
        .map_err(|e| storage(e.error))?;

    info!("Saved {} ({} bytes)", dest.display(), bytes);

    Ok(UploadReceipt { path: dest, bytes })
}

fn multipart_error(err: MultipartError, limit: u64) -> FileServerError {
    match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => FileServerError::PayloadTooLarge { limit },
        _ => FileServerError::MalformedRequest(err.body_text()),
    }
}

/// Reduce a client supplied filename to a safe single path component.
///
/// Returns None for names that are empty, `.` or `..` once reduced.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let sanitized: String = base.chars().filter(|c| !c.is_control()).collect();
    let sanitized = sanitized.trim();

    match sanitized {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}
