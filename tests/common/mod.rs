//! Test utilities and common setup.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use rootshare::{ServiceConfig, Settings};

pub const BOUNDARY: &str = "rootshare-test-boundary";

/// A router serving one temporary directory per root name.
pub struct TestApp {
    pub router: Router,
    pub roots: Vec<TempDir>,
}

impl TestApp {
    pub fn new(names: &[&str]) -> Self {
        Self::with_settings(names, |_| {})
    }

    /// Build the app after letting the caller adjust the settings.
    pub fn with_settings(names: &[&str], adjust: impl FnOnce(&mut Settings)) -> Self {
        let roots: Vec<TempDir> = names.iter().map(|_| TempDir::new().unwrap()).collect();

        let mut settings = Settings {
            roots: names
                .iter()
                .zip(&roots)
                .map(|(name, dir)| format!("{}:{}", name, dir.path().display()))
                .collect(),
            ..Default::default()
        };
        adjust(&mut settings);

        let config = ServiceConfig::from_settings(&settings).unwrap();
        Self {
            router: rootshare::app(Arc::new(config)),
            roots,
        }
    }

    pub fn root(&self, index: usize) -> &Path {
        self.roots[index].path()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    request(Method::GET, uri)
}

/// A single-part `multipart/form-data` body.
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(Method::POST)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, filename, data)))
        .unwrap()
}

/// Like [`upload_request`], but the body is a stream of `chunk_size` pieces.
///
/// `pulled` counts the pieces the server has read so far.
pub fn streamed_upload_request(
    uri: &str,
    filename: &str,
    data: &[u8],
    chunk_size: usize,
    pulled: Arc<AtomicUsize>,
) -> Request<Body> {
    let chunks: Vec<Vec<u8>> = multipart_body("file", filename, data)
        .chunks(chunk_size)
        .map(<[u8]>::to_vec)
        .collect();
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        pulled.fetch_add(1, Ordering::SeqCst);
        Ok::<_, std::io::Error>(chunk)
    }));

    Request::builder()
        .uri(uri)
        .method(Method::POST)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from_stream(stream))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
