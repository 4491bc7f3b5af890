//! Resolution of `[name:]path` arguments into named, validated roots.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StartupError;

/// A directory exposed under `/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRoot {
    pub name: String,
    /// Canonical absolute path of the directory
    pub path: PathBuf,
}

impl NamedRoot {
    pub fn view_prefix(&self) -> String {
        format!("/{}", self.name)
    }

    pub fn upload_prefix(&self) -> String {
        format!("/{}/upload", self.name)
    }

    pub fn files_prefix(&self) -> String {
        format!("/{}/files", self.name)
    }

    pub fn api_prefix(&self) -> String {
        format!("/{}/api/files", self.name)
    }
}

/// Switches controlling how arguments become roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Derive missing names from the last path segment instead of `path<N>`
    pub name_from_parent: bool,
    /// Replace each root by its immediate child directories
    pub expand_subdirectories: bool,
    /// Keep dot-directories when expanding
    pub show_hidden: bool,
}

/// Resolve raw arguments into roots.
///
/// Any invalid path, invalid name or name collision fails the whole call.
pub fn resolve(raw_args: &[String], options: ResolveOptions) -> Result<Vec<NamedRoot>, StartupError> {
    let mut roots: Vec<NamedRoot> = Vec::new();

    for raw in raw_args {
        let (explicit_name, raw_path) = split_argument(raw);
        let path = canonical_dir(Path::new(raw_path))?;

        if options.expand_subdirectories {
            for (entry_path, child) in child_directories(&path, options.show_hidden)? {
                let name = implicit_name(&entry_path, roots.len(), options.name_from_parent);
                push_unique(&mut roots, NamedRoot { name, path: child })?;
            }
            continue;
        }

        let name = match explicit_name {
            Some(name) => normalize_explicit_name(name)?,
            None => implicit_name(&path, roots.len(), options.name_from_parent),
        };
        push_unique(&mut roots, NamedRoot { name, path })?;
    }

    if roots.is_empty() {
        return Err(StartupError::NoRoots);
    }

    Ok(roots)
}

/// Split `name:path`. A prefix containing a path separator is part of the path.
fn split_argument(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once(':') {
        Some((name, path))
            if !name.is_empty() && !path.is_empty() && !name.contains(['/', '\\']) =>
        {
            (Some(name), path)
        }
        _ => (None, raw),
    }
}

fn canonical_dir(raw: &Path) -> Result<PathBuf, StartupError> {
    let invalid = |reason: String| StartupError::InvalidRootPath {
        path: raw.to_path_buf(),
        reason,
    };

    let path = fs::canonicalize(raw).map_err(|e| invalid(e.to_string()))?;
    let metadata = fs::metadata(&path).map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }

    Ok(path)
}

/// Immediate child directories as `(entry path, canonical path)`, sorted.
fn child_directories(
    parent: &Path,
    show_hidden: bool,
) -> Result<Vec<(PathBuf, PathBuf)>, StartupError> {
    let entries = fs::read_dir(parent).map_err(|e| StartupError::InvalidRootPath {
        path: parent.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        if !show_hidden && file_name.to_string_lossy().starts_with('.') {
            debug!("Skipping hidden directory {}", entry.path().display());
            continue;
        }
        let child = entry.path();
        if child.is_dir() {
            let canonical = canonical_dir(&child)?;
            children.push((child, canonical));
        }
    }
    children.sort();

    Ok(children)
}

fn normalize_explicit_name(name: &str) -> Result<String, StartupError> {
    let normalized: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();

    if normalized.is_empty() || !normalized.chars().all(is_name_char) {
        return Err(StartupError::InvalidRootName(name.to_string()));
    }

    Ok(normalized)
}

fn implicit_name(path: &Path, index: usize, name_from_parent: bool) -> String {
    if !name_from_parent {
        return format!("path{}", index);
    }

    let segment = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let derived: String = segment
        .chars()
        .map(|c| if is_name_char(c) { c } else { '-' })
        .collect();

    if derived.is_empty() {
        format!("path{}", index)
    } else {
        derived
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn push_unique(roots: &mut Vec<NamedRoot>, root: NamedRoot) -> Result<(), StartupError> {
    if let Some(first) = roots.iter().find(|existing| existing.name == root.name) {
        return Err(StartupError::DuplicateRootName {
            first: first.path.clone(),
            second: root.path,
            name: root.name,
        });
    }

    debug!("Registered root {} -> {}", root.name, root.path.display());
    roots.push(root);
    Ok(())
}
