//! Item model.
//!
//! An item is one image of the collection. It is identified by its file
//! name, which is unique within the scanned input root.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// One image in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// File name component, the item's stable identifier
    pub name: String,

    /// Original location directly under the input root
    pub source: PathBuf,
}

impl Item {
    /// Build an item from a path, using its file name as the identifier.
    ///
    /// Returns `None` for paths without a UTF-8 file name.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        Some(Self {
            name,
            source: path.to_path_buf(),
        })
    }
}
