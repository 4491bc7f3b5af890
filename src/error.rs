use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Fatal errors raised while building the service, before the listener binds.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Invalid size format: {0:?} (expected a number followed by K, M, G, T or P)")]
    InvalidSizeFormat(String),

    #[error("Invalid root path {path}: {reason}")]
    InvalidRootPath { path: PathBuf, reason: String },

    #[error("Invalid root name: {0:?} (allowed: letters, digits, '-' and '_')")]
    InvalidRootName(String),

    #[error("Duplicate root name {name:?} for {first} and {second}")]
    DuplicateRootName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("No roots to serve")]
    NoRoots,

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-request errors, rendered as JSON bodies.
#[derive(Error, Debug)]
pub enum FileServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Malformed upload request: {0}")]
    MalformedRequest(String),

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Failed to store {path}: {source}")]
    StorageFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to enumerate {path}: {source}")]
    Enumeration {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl FileServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            FileServerError::NotFound(_) => StatusCode::NOT_FOUND,
            FileServerError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            FileServerError::MalformedRequest(_) | FileServerError::InvalidFilename(_) => {
                StatusCode::BAD_REQUEST
            }
            FileServerError::StorageFailure { .. }
            | FileServerError::Enumeration { .. }
            | FileServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            FileServerError::NotFound(_) => "NOT_FOUND",
            FileServerError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            FileServerError::MalformedRequest(_) => "MALFORMED_REQUEST",
            FileServerError::InvalidFilename(_) => "INVALID_FILENAME",
            FileServerError::StorageFailure { .. } => "STORAGE_FAILURE",
            FileServerError::Enumeration { .. } => "ENUMERATION_FAILED",
            FileServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for FileServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}
