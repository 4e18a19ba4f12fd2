//! Atomic file writes for exported tables.
//!
//! Content is written to a temporary sibling, synced, then renamed over
//! the target, so a failed export never leaves a half-written table.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, FsOp, Result};

/// Write content to a file atomically.
///
/// This function:
/// 1. Creates the parent folder if needed
/// 2. Writes content to a temporary file (same path with `.tmp` appended)
/// 3. Calls `fsync` to ensure data is on disk
/// 4. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns `Error::FileSystem` naming the step's path if any operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::fs(FsOp::CreateDir, parent, e))?;
    }

    {
        let file = File::create(&temp_path).map_err(|e| Error::fs(FsOp::Write, &temp_path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(content.as_bytes())
            .and_then(|()| writer.flush())
            .and_then(|()| writer.get_ref().sync_all())
            .map_err(|e| Error::fs(FsOp::Write, &temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| Error::fs(FsOp::Write, path, e))?;

    Ok(())
}

/// Get the size of a file in bytes.
///
/// Returns 0 if the file doesn't exist.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
