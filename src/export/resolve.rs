//! Resolution of database-provided file paths under the data directory

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use super::ExportError;
use crate::logger;

/// A file selected for the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Name inside the archive, relative to the data directory with `/` separators
    pub entry_name: String,
}

/// Resolve every entry to the files it designates under `data_dir`
///
/// - a directory contributes every file below it
/// - a file contributes itself
/// - anything else contributes the sibling files sharing its name as stem
///   (`roads` picks up `roads.shp`, `roads.dbf`, ...)
///
/// Entries that match nothing are logged and skipped. Each file is added once.
pub fn resolve_files(data_dir: &Path, entries: &[String]) -> Result<Vec<ResolvedFile>, ExportError> {
    let root = data_dir.canonicalize()?;
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for entry in entries {
        let relative = checked_relative(entry)?;
        let candidate = root.join(relative);

        let found = if candidate.is_dir() {
            walk_dir(&candidate)?
        } else if candidate.is_file() {
            vec![candidate]
        } else {
            stem_matches(&candidate)?
        };

        if found.is_empty() {
            logger::log_warning(&format!("No data files found for '{entry}', skipping"));
            continue;
        }

        for path in found {
            let canonical = path.canonicalize()?;
            let entry_name = archive_name(&root, &canonical)
                .ok_or_else(|| ExportError::UnsafePath(path.display().to_string()))?;
            if seen.insert(entry_name.clone()) {
                files.push(ResolvedFile {
                    path: canonical,
                    entry_name,
                });
            }
        }
    }

    Ok(files)
}

/// Accept only plain relative paths
fn checked_relative(entry: &str) -> Result<&Path, ExportError> {
    let path = Path::new(entry);
    let plain = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !plain {
        return Err(ExportError::UnsafePath(entry.to_string()));
    }
    Ok(path)
}

/// Path of `file` relative to `root`, `None` when it escapes the root
fn archive_name(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// All files below `dir`, sorted for a stable archive layout
fn walk_dir(dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut children: Vec<PathBuf> = fs::read_dir(&current)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        children.sort();
        for child in children {
            if child.is_dir() {
                pending.push(child);
            } else if child.is_file() {
                files.push(child);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Sibling files whose stem equals the final component of `candidate`
fn stem_matches(candidate: &Path) -> Result<Vec<PathBuf>, ExportError> {
    let (Some(parent), Some(stem)) = (candidate.parent(), candidate.file_name()) else {
        return Ok(Vec::new());
    };
    if !parent.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(parent)? {
        let path = entry?.path();
        if path.is_file() && path.file_stem() == Some(stem) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
