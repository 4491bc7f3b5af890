//! Per-root route registration.
//!
//! The table is an ordered list of `(path, kind)` entries built once from the
//! resolved roots, then turned into an axum router.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{MethodRouter, get, get_service, post},
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::handlers;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// `/`, redirects to the first root
    Index,
    View,
    Upload,
    /// Prefix handed to the static file service
    Files,
    Api,
}

#[derive(Clone)]
pub struct RouteEntry {
    pub path: String,
    pub kind: RouteKind,
    pub state: AppState,
}

pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new(config: Arc<ServiceConfig>) -> Self {
        let mut entries = Vec::new();
        let mut add = |path: String, kind: RouteKind, state: &AppState| {
            entries.push(RouteEntry {
                path,
                kind,
                state: state.clone(),
            })
        };

        if let Some(first) = config.roots.first() {
            let state = AppState::new(first.clone(), Arc::clone(&config));
            add("/".to_string(), RouteKind::Index, &state);
        }

        for root in &config.roots {
            let state = AppState::new(root.clone(), Arc::clone(&config));

            add(root.view_prefix(), RouteKind::View, &state);
            if config.uploads_enabled {
                add(root.upload_prefix(), RouteKind::Upload, &state);
                add(format!("{}/", root.upload_prefix()), RouteKind::Upload, &state);
            }
            if config.downloads_enabled {
                add(root.files_prefix(), RouteKind::Files, &state);
            }
            add(root.api_prefix(), RouteKind::Api, &state);
            add(format!("{}/", root.api_prefix()), RouteKind::Api, &state);
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn into_router(self) -> Router {
        let mut router = Router::new();

        for entry in self.entries {
            router = match entry.kind {
                RouteKind::Index => router.route(
                    &entry.path,
                    get(handlers::index_redirect)
                        .fallback(handlers::not_found)
                        .with_state(entry.state),
                ),
                RouteKind::View => router.route(
                    &entry.path,
                    get(handlers::view)
                        .fallback(handlers::not_found)
                        .with_state(entry.state),
                ),
                RouteKind::Upload => {
                    let limit = body_limit(entry.state.config.max_upload_bytes);
                    router.route(
                        &entry.path,
                        post(handlers::upload)
                            .fallback(handlers::not_found)
                            .layer(DefaultBodyLimit::max(limit))
                            .with_state(entry.state),
                    )
                }
                RouteKind::Files => {
                    let serve_dir = ServeDir::new(&entry.state.root.path)
                        .append_index_html_on_directories(false);
                    let files: MethodRouter =
                        get_service(serve_dir).fallback(handlers::not_found);
                    router.nest_service(&entry.path, files)
                }
                RouteKind::Api => router.route(
                    &entry.path,
                    get(handlers::api_files)
                        .fallback(handlers::not_found)
                        .with_state(entry.state),
                ),
            };
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.fallback(handlers::not_found).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
    }
}

fn body_limit(max_upload_bytes: u64) -> usize {
    usize::try_from(max_upload_bytes).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roots::NamedRoot;
    use std::path::PathBuf;

    fn config(uploads: bool, downloads: bool) -> Arc<ServiceConfig> {
        Arc::new(ServiceConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            roots: vec![
                NamedRoot {
                    name: "docs".to_string(),
                    path: PathBuf::from("/srv/docs"),
                },
                NamedRoot {
                    name: "music".to_string(),
                    path: PathBuf::from("/srv/music"),
                },
            ],
            max_upload_bytes: 1024,
            uploads_enabled: uploads,
            downloads_enabled: downloads,
            show_hidden: false,
        })
    }

    fn paths(table: &RouteTable) -> Vec<(&str, RouteKind)> {
        table
            .entries()
            .iter()
            .map(|e| (e.path.as_str(), e.kind))
            .collect()
    }

    #[test]
    fn test_route_table_order() {
        let table = RouteTable::new(config(true, true));
        assert_eq!(
            paths(&table),
            vec![
                ("/", RouteKind::Index),
                ("/docs", RouteKind::View),
                ("/docs/upload", RouteKind::Upload),
                ("/docs/upload/", RouteKind::Upload),
                ("/docs/files", RouteKind::Files),
                ("/docs/api/files", RouteKind::Api),
                ("/docs/api/files/", RouteKind::Api),
                ("/music", RouteKind::View),
                ("/music/upload", RouteKind::Upload),
                ("/music/upload/", RouteKind::Upload),
                ("/music/files", RouteKind::Files),
                ("/music/api/files", RouteKind::Api),
                ("/music/api/files/", RouteKind::Api),
            ]
        );
    }

    #[test]
    fn test_route_table_states_match_roots() {
        let table = RouteTable::new(config(true, true));
        for entry in table.entries() {
            match entry.kind {
                RouteKind::Index => assert_eq!(entry.state.root.name, "docs"),
                _ => assert!(entry.path.starts_with(&entry.state.root.view_prefix())),
            }
        }
    }

    #[test]
    fn test_route_table_skips_disabled_features() {
        let table = RouteTable::new(config(false, false));
        let kinds: Vec<RouteKind> = table.entries().iter().map(|e| e.kind).collect();
        assert!(!kinds.contains(&RouteKind::Upload));
        assert!(!kinds.contains(&RouteKind::Files));
        assert!(kinds.contains(&RouteKind::View));
        assert!(kinds.contains(&RouteKind::Api));
    }

    #[test]
    fn test_body_limit() {
        assert_eq!(body_limit(1024), 1024);
        assert_eq!(body_limit(0), 0);
    }
}
