use super::error::{QueueError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default source extensions selected for encoding
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp4", "mov", "ts"];

/// Files under an input root, split by whether they get a queue entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Files matching the allowed extensions, in path order
    pub selected: Vec<PathBuf>,
    /// Every other regular file, in path order
    pub excluded: Vec<PathBuf>,
}

/// Normalize user-supplied extensions: strip leading dots, lowercase, drop empties
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = extensions
        .iter()
        .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Check if a path's extension is one of `extensions` (already normalized), ignoring case
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            extensions.iter().any(|allowed| *allowed == ext)
        })
        .unwrap_or(false)
}

/// Walk `root` recursively and invoke a callback for each regular file
///
/// Links to directories are not descended into; links to regular files are
/// reported under their link path. Entries under `skip` are pruned from the walk.
pub fn scan_streaming<F>(root: &Path, skip: Option<&Path>, mut on_file: F) -> Result<()>
where
    F: FnMut(PathBuf),
{
    if !root.is_dir() {
        return Err(QueueError::InputNotFound {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| skip.is_none_or(|skip| entry.path() != skip));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file {
            on_file(entry.into_path());
        }
    }

    Ok(())
}

/// Every regular file under `root`, or only those matching `extensions` when non-empty
pub fn discover<S: AsRef<str>>(root: &Path, extensions: &[S]) -> Result<Vec<PathBuf>> {
    let extensions = normalize_extensions(extensions);
    let mut files = Vec::new();
    scan_streaming(root, None, |path| {
        if extensions.is_empty() || has_extension(&path, &extensions) {
            files.push(path);
        }
    })?;
    files.sort();
    Ok(files)
}

/// Split the files under `root` into selected and excluded sets in one walk
pub fn partition<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
    skip: Option<&Path>,
) -> Result<Partition> {
    let extensions = normalize_extensions(extensions);
    let mut result = Partition::default();
    scan_streaming(root, skip, |path| {
        if has_extension(&path, &extensions) {
            result.selected.push(path);
        } else {
            result.excluded.push(path);
        }
    })?;
    result.selected.sort();
    result.excluded.sort();
    Ok(result)
}
