//! Multi-root file server.
//!
//! Each configured directory is exposed under its own name: a browse page at
//! `/<name>`, uploads at `/<name>/upload`, raw files under `/<name>/files/`
//! and a JSON listing at `/<name>/api/files`.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod page;
pub mod roots;
pub mod routes;
pub mod size;
pub mod upload;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub use config::{ServiceConfig, Settings};
pub use error::{FileServerError, StartupError};
pub use roots::NamedRoot;
pub use routes::RouteTable;

/// State handed to every handler registered for one root
#[derive(Clone)]
pub struct AppState {
    /// Root this handler set serves
    pub root: NamedRoot,
    /// Configuration
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(root: NamedRoot, config: Arc<ServiceConfig>) -> Self {
        Self { root, config }
    }
}

/// Build the complete router for `config`.
pub fn app(config: Arc<ServiceConfig>) -> Router {
    RouteTable::new(config).into_router()
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: ServiceConfig) -> Result<(), StartupError> {
    let addr = config.listen_addr()?;
    let app = app(Arc::new(config));

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
