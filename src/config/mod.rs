//! Configuration management.
//!
//! Settings live in an optional JSON file. Every field has a default, so a
//! missing file or a partial one is fine.
//!
//! # Resolution
//!
//! 1. Explicit `--config` flag
//! 2. `IMGTAG_CONFIG` environment variable
//! 3. `~/.imgtag/config.json`
//!
//! # Example
//!
//! ```json
//! {
//!   "extensions": ["jpg", "jpeg", "png", "webp"],
//!   "output_dir": "output",
//!   "advance_on_label": true
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Recognized image extensions, matched case-insensitively.
    pub extensions: Vec<String>,

    /// Subfolder of the input root that receives tables.
    pub output_dir: String,

    /// File stem of explicit exports.
    pub export_file: String,

    /// File stem of the export written when a session ends.
    pub auto_export_file: String,

    /// Move to the next item after each toggle.
    pub advance_on_label: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string(), "png".to_string(), "jpeg".to_string()],
            output_dir: "output".to_string(),
            export_file: "assigned_classes".to_string(),
            auto_export_file: "assigned_classes_automatically_generated".to_string(),
            advance_on_label: false,
        }
    }
}

impl Settings {
    /// Load settings from a file; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;

        if settings.extensions.is_empty() {
            return Err(Error::Config(format!(
                "{}: extensions cannot be empty",
                path.display()
            )));
        }
        debug!(path = %path.display(), "Loaded config");
        Ok(settings)
    }

    /// Resolve the config path and load it.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the resolved file cannot be parsed.
    pub fn resolve(explicit_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(explicit_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Table path for explicit exports under an input root.
    #[must_use]
    pub fn export_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir).join(format!("{}.csv", self.export_file))
    }

    /// Table path for the export written when a session ends.
    #[must_use]
    pub fn auto_export_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
            .join(format!("{}.csv", self.auto_export_file))
    }
}

/// Get the global imgtag directory location (`~/.imgtag/`).
#[must_use]
pub fn global_imgtag_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".imgtag"))
}

/// Resolve the config file path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `IMGTAG_CONFIG` environment variable
/// 3. `~/.imgtag/config.json`
#[must_use]
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("IMGTAG_CONFIG") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    global_imgtag_dir().map(|dir| dir.join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.extensions, vec!["jpg", "png", "jpeg"]);
        assert!(!s.advance_on_label);
        assert_eq!(
            s.export_path(Path::new("/data")),
            PathBuf::from("/data/output/assigned_classes.csv")
        );
        assert_eq!(
            s.auto_export_path(Path::new("/data")),
            PathBuf::from("/data/output/assigned_classes_automatically_generated.csv")
        );
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let s = Settings::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"output_dir": "tables", "advance_on_label": true}"#).unwrap();

        let s = Settings::load(&path).unwrap();
        assert_eq!(s.output_dir, "tables");
        assert!(s.advance_on_label);
        assert_eq!(s.extensions, Settings::default().extensions);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load(&path), Err(Error::Config(_))));

        fs::write(&path, r#"{"extensions": []}"#).unwrap();
        assert!(matches!(Settings::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_config_path_with_explicit() {
        let explicit = PathBuf::from("/custom/imgtag.json");
        assert_eq!(resolve_config_path(Some(&explicit)), Some(explicit));
    }

    #[test]
    fn test_global_dir_ends_with_imgtag() {
        let dir = global_imgtag_dir().unwrap();
        assert!(dir.ends_with(".imgtag"));
    }
}
