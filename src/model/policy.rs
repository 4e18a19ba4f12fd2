//! Synchronization policy and toggle outcome.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::validate::normalize_mode;

/// How label membership is mirrored onto the folder tree.
///
/// Chosen once per session and immutable thereafter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPolicy {
    /// No file-system side effects; the table is the only record.
    #[default]
    #[serde(rename = "csv")]
    RecordOnly,
    /// Labeled items are copied into each label's folder.
    #[serde(rename = "copy")]
    Duplicate,
    /// Items are moved into their first label's folder.
    #[serde(rename = "move")]
    Relocate,
}

impl SyncPolicy {
    pub const ALL: [Self; 3] = [Self::RecordOnly, Self::Duplicate, Self::Relocate];

    /// The mode name used on the command line and in output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RecordOnly => "csv",
            Self::Duplicate => "copy",
            Self::Relocate => "move",
        }
    }

    /// Whether the policy needs a folder per catalog label.
    #[must_use]
    pub const fn uses_label_folders(&self) -> bool {
        matches!(self, Self::Duplicate | Self::Relocate)
    }
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_mode(s) {
            Ok(mode) => match mode.as_str() {
                "copy" => Ok(Self::Duplicate),
                "move" => Ok(Self::Relocate),
                _ => Ok(Self::RecordOnly),
            },
            Err((input, Some(suggestion))) => Err(Error::InvalidArgument(format!(
                "unknown mode '{input}' (did you mean '{suggestion}'?)"
            ))),
            Err((input, None)) => Err(Error::InvalidArgument(format!("unknown mode '{input}'"))),
        }
    }
}

/// What a toggle did to an item's assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Added,
    Removed,
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
        }
    }
}
