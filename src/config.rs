use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StartupError;
use crate::roots::{self, NamedRoot, ResolveOptions};
use crate::size;

/// File/CLI level settings, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum upload size, e.g. `512M` or `1G`
    pub max_upload: String,

    /// Accept uploads
    pub uploads: bool,

    /// Serve file downloads and listings
    pub downloads: bool,

    /// List and expand dot-files
    pub show_hidden: bool,

    /// Name unnamed roots after their directory
    pub name_from_parent: bool,

    /// Serve each immediate subdirectory of a root as its own root
    pub subdirectories: bool,

    /// Roots as `[name:]path`
    pub roots: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6969,
            max_upload: "1G".to_string(),
            uploads: true,
            downloads: true,
            show_hidden: false,
            name_from_parent: false,
            subdirectories: false,
            roots: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, StartupError> {
        let content = std::fs::read_to_string(path).map_err(|source| StartupError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| StartupError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            name_from_parent: self.name_from_parent,
            expand_subdirectories: self.subdirectories,
            show_hidden: self.show_hidden,
        }
    }
}

/// Validated runtime configuration, immutable once the server starts.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub roots: Vec<NamedRoot>,
    pub max_upload_bytes: u64,
    pub uploads_enabled: bool,
    pub downloads_enabled: bool,
    pub show_hidden: bool,
}

impl ServiceConfig {
    /// Parse sizes and resolve roots. Serves `.` when no root is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, StartupError> {
        let max_upload_bytes = size::from_human(&settings.max_upload)?;

        let raw_roots = if settings.roots.is_empty() {
            vec![".".to_string()]
        } else {
            settings.roots.clone()
        };
        let roots = roots::resolve(&raw_roots, settings.resolve_options())?;

        Ok(Self {
            host: settings.host.clone(),
            port: settings.port,
            roots,
            max_upload_bytes,
            uploads_enabled: settings.uploads,
            downloads_enabled: settings.downloads,
            show_hidden: settings.show_hidden,
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.to_socket_addrs()
            .map_err(|e| StartupError::InvalidAddress(format!("{}: {}", addr, e)))?
            .next()
            .ok_or(StartupError::InvalidAddress(addr))
    }
}
