//! Copy a nested prompt tree into one flat directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{is_document, StoreError};

/// One file copied by [`flatten`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// True when an earlier file in this run already produced the same name.
    pub overwrote: bool,
}

/// Outcome of a [`flatten`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenReport {
    pub copied: usize,
    pub collisions: usize,
    pub destination: PathBuf,
}

/// Name a document gets inside the flattened directory.
///
/// Files directly under `root` keep their name. Anything deeper is prefixed
/// with its directory components joined by `-`, then `--`:
/// `root/tone/business/formal.md` becomes `tone-business--formal.md`.
pub fn safe_flattened_name(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let file_name = relative.file_name()?.to_string_lossy();

    let prefix: Vec<String> = relative
        .parent()
        .map(|dir| {
            dir.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    if prefix.is_empty() {
        Some(file_name.into_owned())
    } else {
        Some(format!("{}--{}", prefix.join("-"), file_name))
    }
}

/// Recursively copy every `.md` file under `root` into `destination`.
///
/// `destination` is created if missing and skipped during the walk even when it
/// sits inside `root`. Walk order is sorted by filename, so when two sources map
/// to the same flattened name the later one deterministically wins. Modification
/// times are carried over. `on_copy` is called after each file is written.
pub fn flatten<F>(
    root: &Path,
    destination: &Path,
    mut on_copy: F,
) -> Result<FlattenReport, StoreError>
where
    F: FnMut(&FlattenedCopy),
{
    if !root.is_dir() {
        return Err(StoreError::StoreUnavailable(root.to_path_buf()));
    }

    fs::create_dir_all(destination).map_err(|e| StoreError::io(destination, e))?;
    let root = root.canonicalize().map_err(|e| StoreError::io(root, e))?;
    let destination = destination
        .canonicalize()
        .map_err(|e| StoreError::io(destination, e))?;

    let mut report = FlattenReport {
        destination: destination.clone(),
        ..Default::default()
    };
    let mut seen = HashSet::new();

    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != destination);

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
            StoreError::io(path, e.into())
        })?;

        if !entry.file_type().is_file() || !is_document(entry.path()) {
            continue;
        }

        let Some(safe_name) = safe_flattened_name(&root, entry.path()) else {
            continue;
        };
        let target = destination.join(&safe_name);
        let overwrote = !seen.insert(safe_name.clone());
        if overwrote {
            tracing::warn!(
                "Flattened name collision: {} overwrites an earlier copy of {}",
                entry.path().display(),
                safe_name
            );
            report.collisions += 1;
        }

        copy_preserving_mtime(entry.path(), &target)?;
        report.copied += 1;

        on_copy(&FlattenedCopy {
            source: entry.path().to_path_buf(),
            destination: target,
            overwrote,
        });
    }

    tracing::info!(
        "Flattened {} documents into {}",
        report.copied,
        report.destination.display()
    );
    Ok(report)
}

fn copy_preserving_mtime(source: &Path, target: &Path) -> Result<(), StoreError> {
    fs::copy(source, target).map_err(|e| StoreError::io(source, e))?;

    let modified = fs::metadata(source)
        .and_then(|m| m.modified())
        .map_err(|e| StoreError::io(source, e))?;
    fs::File::options()
        .write(true)
        .open(target)
        .and_then(|f| f.set_modified(modified))
        .map_err(|e| StoreError::io(target, e))
}
