//! Error types for imgtag.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=label, 3=table, 4=filesystem, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for imgtag operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Labels and items (exit 2)
    InvalidLabel,
    UnknownItem,

    // Table (exit 3)
    MalformedRow,
    InvalidTable,

    // File system (exit 4)
    FileSystemError,
    IoError,

    // Input validation (exit 5)
    InvalidArgument,
    NoItems,

    // Config (exit 6)
    ConfigError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::InvalidLabel => "INVALID_LABEL",
            Self::UnknownItem => "UNKNOWN_ITEM",
            Self::MalformedRow => "MALFORMED_ROW",
            Self::InvalidTable => "INVALID_TABLE",
            Self::FileSystemError => "FILE_SYSTEM_ERROR",
            Self::IoError => "IO_ERROR",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NoItems => "NO_ITEMS",
            Self::ConfigError => "CONFIG_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code (2-6).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidLabel | Self::UnknownItem => 2,
            Self::MalformedRow | Self::InvalidTable => 3,
            Self::FileSystemError | Self::IoError => 4,
            Self::InvalidArgument | Self::NoItems => 5,
            Self::ConfigError | Self::JsonError => 6,
        }
    }

    /// Whether retrying with corrected input can succeed.
    ///
    /// File-system failures are not retryable here: the in-memory change
    /// already happened and repeating the toggle would undo it.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidLabel | Self::UnknownItem | Self::InvalidArgument | Self::MalformedRow
        )
    }
}

// ── File-system operation ─────────────────────────────────────

/// The file-system primitive that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    CreateDir,
    Copy,
    Move,
    Delete,
    Scan,
    Write,
    Read,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateDir => "create folder",
            Self::Copy => "copy",
            Self::Move => "move",
            Self::Delete => "delete",
            Self::Scan => "scan",
            Self::Write => "write",
            Self::Read => "read",
        };
        f.write_str(s)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in imgtag operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Label not in catalog: {label}")]
    InvalidLabel { label: String, similar: Vec<String> },

    #[error("Item not in session: {item}")]
    UnknownItem { item: String },

    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Invalid table {path}: {reason}")]
    InvalidTable { path: PathBuf, reason: String },

    #[error("Failed to {op} {path}: {source}")]
    FileSystem {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No images found in {folder}")]
    NoItems { folder: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a [`Error::FileSystem`] for a failed primitive.
    pub fn fs(op: FsOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            op,
            path: path.into(),
            source,
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidLabel { .. } => ErrorCode::InvalidLabel,
            Self::UnknownItem { .. } => ErrorCode::UnknownItem,
            Self::MalformedRow { .. } => ErrorCode::MalformedRow,
            Self::InvalidTable { .. } => ErrorCode::InvalidTable,
            Self::FileSystem { .. } => ErrorCode::FileSystemError,
            Self::NoItems { .. } => ErrorCode::NoItems,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidLabel { similar, .. } => {
                if similar.is_empty() {
                    Some("Use `status` to list the catalog labels and their numbers.".to_string())
                } else {
                    Some(format!("Did you mean: {}?", similar.join(", ")))
                }
            }

            Self::UnknownItem { item } => Some(format!(
                "'{item}' was not found in the input folder. Use `imgtag scan` to list items."
            )),

            Self::MalformedRow { .. } => Some(
                "Each row needs one digit per catalog label, and every digit must be 0 or 1."
                    .to_string(),
            ),

            Self::InvalidTable { .. } => Some(
                "The first row must be a header: item,<label_1>,...,<label_n>".to_string(),
            ),

            Self::FileSystem { op, .. } => Some(match op {
                FsOp::Copy | FsOp::Move | FsOp::Delete => {
                    "The label was recorded, but the folder tree no longer matches it. \
                     Fix the file by hand or toggle the label again once the cause is resolved."
                        .to_string()
                }
                _ => "Check that the folder exists and is writable.".to_string(),
            }),

            Self::NoItems { .. } => {
                Some("Recognized extensions: jpg, jpeg, png (see `extensions` in config).".to_string())
            }

            Self::InvalidArgument(msg) => {
                if msg.contains("mode") {
                    Some("Valid modes: csv, copy, move".to_string())
                } else if msg.contains("label") {
                    Some("Labels are comma-separated: --labels cat,dog,bird".to_string())
                } else {
                    None
                }
            }

            Self::Io(_) | Self::Json(_) | Self::Config(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        let err = Error::InvalidLabel {
            label: "bird".to_string(),
            similar: Vec::new(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = Error::MalformedRow {
            row: 3,
            reason: "expected 2 digits, got 1".to_string(),
        };
        assert_eq!(err.exit_code(), 3);

        let err = Error::fs(
            FsOp::Move,
            "/tmp/a.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.exit_code(), 4);
        assert!(!err.error_code().is_retryable());
    }

    #[test]
    fn test_file_system_message_names_op_and_path() {
        let err = Error::fs(
            FsOp::Copy,
            "/data/cat/a.jpg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("copy"));
        assert!(msg.contains("/data/cat/a.jpg"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::InvalidArgument("unknown mode: teleport".to_string());
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "INVALID_ARGUMENT");
        assert_eq!(json["error"]["retryable"], true);
        assert_eq!(json["error"]["hint"], "Valid modes: csv, copy, move");
    }

    #[test]
    fn test_structured_json_without_hint() {
        let err = Error::Config("cannot parse config.json".to_string());
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "CONFIG_ERROR");
        assert_eq!(json["error"]["exit_code"], 6);
        assert!(json["error"].get("hint").is_none());
    }
}
