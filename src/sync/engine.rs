//! Policy-driven file-system side effects.
//!
//! The engine keeps the label folders under the input root consistent with
//! the assignment store. It holds no session state: every call receives the
//! policy, the root and the store as they are after the toggle.
//!
//! # Policies
//!
//! | Policy      | Added (first label) | Added (later)          | Removed (others left) | Removed (last)        |
//! |-------------|---------------------|------------------------|-----------------------|-----------------------|
//! | RecordOnly  | nothing             | nothing                | nothing               | nothing               |
//! | Duplicate   | copy source → label | copy source → label    | delete label copy     | delete label copy     |
//! | Relocate    | move source → label | copy current → label   | delete label copy     | move label → root     |
//!
//! Under `Relocate` the canonical location is the folder of the item's
//! first-assigned label.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{Catalog, Item, SyncPolicy, ToggleAction};
use crate::store::AssignmentStore;
use crate::sync::fs::{FileOps, LocalFs};

/// Path of an item's file inside a label folder.
#[must_use]
pub fn label_path(root: &Path, label: &str, item_name: &str) -> PathBuf {
    root.join(label).join(item_name)
}

/// Where the item's file currently lives, for display.
///
/// `RecordOnly` and `Duplicate` never move the source. Under `Relocate`
/// an unlabeled item is at its source path and a labeled one is in the
/// folder of its first-assigned label.
#[must_use]
pub fn current_path(
    policy: SyncPolicy,
    root: &Path,
    item: &Item,
    store: &AssignmentStore,
) -> PathBuf {
    match policy {
        SyncPolicy::RecordOnly | SyncPolicy::Duplicate => item.source.clone(),
        SyncPolicy::Relocate => store.first_label(&item.name).map_or_else(
            || item.source.clone(),
            |label| label_path(root, label, &item.name),
        ),
    }
}

/// Applies side effects of toggles according to a [`SyncPolicy`].
#[derive(Debug, Clone, Default)]
pub struct SyncEngine<F = LocalFs> {
    fs: F,
}

impl<F: FileOps> SyncEngine<F> {
    /// Create an engine over a file-system implementation.
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Create one folder per catalog label when the policy needs them.
    ///
    /// Existing folders are left alone.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileSystem` if a folder cannot be created.
    pub fn prepare(&self, policy: SyncPolicy, root: &Path, catalog: &Catalog) -> Result<()> {
        if !policy.uses_label_folders() {
            return Ok(());
        }

        for label in catalog.iter() {
            self.fs.create_dir_all(&root.join(label))?;
        }
        info!(root = %root.display(), folders = catalog.len(), "Label folders ready");
        Ok(())
    }

    /// Perform the side effect of a toggle that already happened in `store`.
    ///
    /// The store is not rolled back when this fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileSystem` if the copy, move or delete fails.
    pub fn apply(
        &self,
        policy: SyncPolicy,
        root: &Path,
        item: &Item,
        label: &str,
        action: ToggleAction,
        store: &AssignmentStore,
    ) -> Result<()> {
        let target = label_path(root, label, &item.name);

        match policy {
            SyncPolicy::RecordOnly => return Ok(()),

            SyncPolicy::Duplicate => match action {
                ToggleAction::Added => self.fs.copy(&item.source, &target)?,
                ToggleAction::Removed => self.fs.remove(&target)?,
            },

            SyncPolicy::Relocate => match action {
                ToggleAction::Added if store.labels_for(&item.name).len() <= 1 => {
                    self.fs.rename(&item.source, &target)?;
                }
                ToggleAction::Added => {
                    let from = current_path(policy, root, item, store);
                    self.fs.copy(&from, &target)?;
                }
                ToggleAction::Removed if store.is_labeled(&item.name) => {
                    self.fs.remove(&target)?;
                }
                ToggleAction::Removed => self.fs.rename(&target, &item.source)?,
            },
        }

        debug!(item = %item.name, label, %action, %policy, "Synced toggle");
        Ok(())
    }
}
