//! Recursive listing of a root's files.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::FileServerError;
use crate::roots::NamedRoot;
use crate::size;

/// A listed file, serialized for the JSON listing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "size")]
    pub size_human: String,
    #[serde(rename = "modified")]
    pub modified_at: String,
    /// URL of the raw file, under the root's files prefix
    #[serde(rename = "wpath")]
    pub web_path: String,
    /// Path relative to the root, `/` separated
    #[serde(rename = "rpath")]
    pub relative_path: String,
}

const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Walk `root` and return every regular file below it, including symlinks to
/// files. Symlinked directories are not descended into.
///
/// Unreadable entries are logged and skipped. Only a root that cannot be
/// opened fails the listing.
pub fn list(
    root: &NamedRoot,
    web_prefix: &str,
    show_hidden: bool,
) -> Result<Vec<FileEntry>, FileServerError> {
    let mut files = Vec::new();

    // Hidden directories are pruned whole, so no descendant of one is visited.
    let walker = WalkDir::new(&root.path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| show_hidden || e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 => {
                return Err(FileServerError::Enumeration {
                    path: root.path.clone(),
                    source: err.into(),
                });
            }
            Err(err) => {
                warn!("Skipping unreadable entry in {}: {}", root.name, err);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let metadata = match file_metadata(&entry) {
            Ok(m) => m,
            Err(err) => {
                warn!("Skipping {}: {}", entry.path().display(), err);
                continue;
            }
        };
        // Symlinks are listed when they point at a regular file.
        if !metadata.is_file() {
            continue;
        }

        let relative_path = match relative_web_path(&root.path, entry.path()) {
            Some(p) => p,
            None => continue,
        };

        files.push(FileEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            size_human: size::to_human(metadata.len()),
            modified_at: metadata
                .modified()
                .map(format_modified)
                .unwrap_or_default(),
            web_path: format!("{}/{}", web_prefix.trim_end_matches('/'), relative_path),
            relative_path,
        });
    }

    debug!("Listed {} files under {}", files.len(), root.path.display());

    Ok(files)
}

/// Metadata of the entry, or of its target when it is a symlink.
fn file_metadata(entry: &DirEntry) -> io::Result<Metadata> {
    if entry.path_is_symlink() {
        fs::metadata(entry.path())
    } else {
        entry.metadata().map_err(io::Error::from)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Root-relative path joined with `/` whatever the host separator.
fn relative_web_path(root: &Path, full_path: &Path) -> Option<String> {
    let relative = full_path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

fn format_modified(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(MODIFIED_FORMAT).to_string()
}
