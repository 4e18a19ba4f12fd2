//! File-system primitives used by the sync engine.
//!
//! The engine only talks to the folder tree through [`FileOps`], so tests
//! can substitute a double that fails on demand. [`LocalFs`] is the real
//! implementation over `std::fs`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, FsOp, Result};
use crate::model::Item;

/// Trait for the file-system collaborator.
///
/// Every failure is reported as `Error::FileSystem` carrying the attempted
/// path and the underlying cause.
pub trait FileOps {
    /// Create a folder and its parents. Existing folders are not an error.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy a file to a full destination path.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Move a file to a full destination path.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete a file.
    fn remove(&self, path: &Path) -> Result<()>;
}

/// [`FileOps`] over the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileOps for LocalFs {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::fs(FsOp::CreateDir, path, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        debug!(from = %from.display(), to = %to.display(), "copy");
        fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| Error::fs(FsOp::Copy, from, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        debug!(from = %from.display(), to = %to.display(), "move");
        fs::rename(from, to).map_err(|e| Error::fs(FsOp::Move, from, e))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "delete");
        fs::remove_file(path).map_err(|e| Error::fs(FsOp::Delete, path, e))
    }
}

/// Whether a path has one of the recognized extensions (case-insensitive).
#[must_use]
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

/// Scan a folder (not recursively) for images.
///
/// Items are returned sorted by name. Callers must not rely on any order
/// beyond "a total order covering all discovered items".
///
/// # Errors
///
/// Returns `Error::FileSystem` if the folder cannot be listed.
pub fn scan_folder(root: &Path, extensions: &[String]) -> Result<Vec<Item>> {
    let entries = fs::read_dir(root).map_err(|e| Error::fs(FsOp::Scan, root, e))?;

    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::fs(FsOp::Scan, root, e))?;
        let path: PathBuf = entry.path();

        if !path.is_file() || !has_extension(&path, extensions) {
            continue;
        }

        match Item::from_path(&path) {
            Some(item) => items.push(item),
            None => warn!(path = %path.display(), "Skipping file with non UTF-8 name"),
        }
    }

    items.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(root = %root.display(), count = items.len(), "Scanned folder");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
    }

    #[test]
    fn test_has_extension_case_insensitive() {
        assert!(has_extension(Path::new("a.JPG"), &exts()));
        assert!(has_extension(Path::new("b.png"), &exts()));
        assert!(!has_extension(Path::new("c.gif"), &exts()));
        assert!(!has_extension(Path::new("jpg"), &exts()));
        assert!(has_extension(Path::new("d.webp"), &[".webp".to_string()]));
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.jpg"), b"b").unwrap();
        fs::write(dir.path().join("a.PNG"), b"a").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("cat.jpg")).unwrap();

        let items = scan_folder(dir.path(), &exts()).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.PNG", "b.jpg"]);
        assert_eq!(items[1].source, dir.path().join("b.jpg"));
    }

    #[test]
    fn test_scan_missing_folder() {
        let err = scan_folder(Path::new("/nonexistent/imgtag/folder"), &exts()).unwrap_err();
        assert!(matches!(err, Error::FileSystem { op: FsOp::Scan, .. }));
    }

    #[test]
    fn test_create_dir_all_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("cat");
        LocalFs.create_dir_all(&target).unwrap();
        LocalFs.create_dir_all(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_remove_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("gone.jpg");
        match LocalFs.remove(&target) {
            Err(Error::FileSystem { op, path, .. }) => {
                assert_eq!(op, FsOp::Delete);
                assert_eq!(path, target);
            }
            other => panic!("expected FileSystem error, got {other:?}"),
        }
    }
}
