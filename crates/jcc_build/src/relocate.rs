use std::fs;
use std::path::{Path, PathBuf};

use jcc_scan::GlobPattern;

use crate::BuildError;

/// Copy the files in `source_dir` (non-recursive) whose names match
/// `pattern` into `dest_dir`, creating the destination chain on demand.
/// Returns the destination paths in name order. A missing source directory
/// copies nothing.
pub fn copy_matching(
    source_dir: &Path,
    dest_dir: &Path,
    pattern: &GlobPattern,
) -> Result<Vec<PathBuf>, BuildError> {
    if !source_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    let entries = fs::read_dir(source_dir).map_err(|source| BuildError::Io {
        path: source_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| BuildError::Io {
            path: source_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if pattern.matches_name(&name) {
            names.push(name);
        }
    }
    names.sort();

    if names.is_empty() {
        return Ok(Vec::new());
    }

    fs::create_dir_all(dest_dir).map_err(|source| BuildError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    let mut copied = Vec::with_capacity(names.len());
    for name in names {
        let from = source_dir.join(&name);
        let to = dest_dir.join(&name);
        fs::copy(&from, &to).map_err(|source| BuildError::Io {
            path: from.clone(),
            source,
        })?;
        tracing::debug!(from = %from.display(), to = %to.display(), "relocated artifact");
        copied.push(to);
    }
    Ok(copied)
}

/// List the files in `dir` matching `pattern`, in name order.
pub(crate) fn list_matching(dir: &Path, pattern: &GlobPattern) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| pattern.matches_name(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .collect();
    found.sort();
    found
}

/// True when `candidate` sits underneath `root`, tolerating not-yet
/// canonicalizable paths.
pub(crate) fn path_within(root: &Path, candidate: &Path) -> bool {
    let Ok(root_canonical) = fs::canonicalize(root) else {
        return candidate.starts_with(root);
    };
    match fs::canonicalize(candidate) {
        Ok(candidate) => candidate.starts_with(&root_canonical),
        Err(_) => candidate.starts_with(root),
    }
}

pub(crate) fn under_any(candidate: &Path, roots: &[PathBuf]) -> bool {
    roots.iter().any(|root| path_within(root, candidate))
}
