//! Labeling session.
//!
//! A session owns the catalog (through the store), the item sequence, the
//! cursor and the policy. Every label toggle updates the store first and
//! then asks the sync engine for the file-system side effect; a failed side
//! effect is reported but the store keeps the change.
//!
//! The presentation layer drives a session with [`SessionCommand`] values
//! routed through [`Session::handle`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::model::{Catalog, Item, SyncPolicy, ToggleAction};
use crate::store::{AssignmentStore, OneHot};
use crate::sync::{
    current_path, import_rows, read_table, scan_folder, write_table, ExportStats, FileOps,
    ImportStats, LocalFs, SyncEngine,
};

/// A command from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Move to the next item (stays on the last one).
    Next,
    /// Move to the previous item (stays on the first one).
    Prev,
    /// Jump to a 1-based item position.
    Goto(usize),
    /// Toggle a label by name on the current item.
    Toggle(String),
    /// Toggle the k-th catalog label (1-based) on the current item.
    ToggleKey(usize),
    /// Write the table now.
    Export,
    /// Report the current state.
    Status,
    /// End the session, exporting on the way out.
    Quit,
}

/// What a command did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Moved {
        position: usize,
        moved: bool,
    },
    Toggled {
        item: String,
        label: String,
        action: ToggleAction,
    },
    Exported(ExportStats),
    Status,
    Ended {
        export: Option<ExportStats>,
    },
}

/// A catalog label and whether the current item carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelState {
    /// 1-based key that toggles this label.
    pub key: usize,
    pub label: String,
    pub active: bool,
}

/// Snapshot of the session for display.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// 1-based position of the current item.
    pub position: usize,
    pub count: usize,
    pub item: String,
    /// Where the current item's file is right now.
    pub path: PathBuf,
    pub policy: SyncPolicy,
    pub labels: Vec<LabelState>,
    pub labeled_items: usize,
}

impl SessionStatus {
    /// Progress text, e.g. `image 3 of 10`.
    #[must_use]
    pub fn progress(&self) -> String {
        format!("image {} of {}", self.position, self.count)
    }
}

/// The table a session was opened from.
#[derive(Debug)]
struct SourceTable {
    /// Canonical path, for comparing against export targets.
    path: PathBuf,
    /// Labeled rows for items outside the folder.
    carried: Vec<(String, OneHot)>,
}

/// An active labeling session.
#[derive(Debug)]
pub struct Session<F: FileOps = LocalFs> {
    root: PathBuf,
    policy: SyncPolicy,
    settings: Settings,
    items: Vec<Item>,
    store: AssignmentStore,
    cursor: usize,
    engine: SyncEngine<F>,
    import: Option<ImportStats>,
    source: Option<SourceTable>,
}

impl Session<LocalFs> {
    /// Start a fresh session over a folder with typed-in labels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a missing folder or bad labels,
    /// `NoItems` for a folder without images, and `FileSystem` if label
    /// folders cannot be created.
    pub fn create(
        root: &Path,
        labels: Vec<String>,
        policy: SyncPolicy,
        settings: Settings,
    ) -> Result<Self> {
        Self::create_with(LocalFs, root, labels, policy, settings)
    }

    /// Start a session from a folder and a previously exported table.
    ///
    /// The catalog comes from the table header. Import never performs
    /// file-system side effects, whatever the policy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTable` for an unusable header, plus the errors of
    /// [`Session::create`].
    pub fn open(root: &Path, table: &Path, policy: SyncPolicy, settings: Settings) -> Result<Self> {
        Self::open_with(LocalFs, root, table, policy, settings)
    }
}

impl<F: FileOps> Session<F> {
    /// [`Session::create`] over a custom file-system implementation.
    ///
    /// # Errors
    ///
    /// See [`Session::create`].
    pub fn create_with(
        fs: F,
        root: &Path,
        labels: Vec<String>,
        policy: SyncPolicy,
        settings: Settings,
    ) -> Result<Self> {
        let catalog = Catalog::new(labels)?;
        let session = Self::build(fs, root, catalog, policy, settings)?;
        info!(
            root = %session.root.display(),
            items = session.items.len(),
            labels = session.store.catalog().len(),
            %policy,
            "Session started"
        );
        Ok(session)
    }

    /// [`Session::open`] over a custom file-system implementation.
    ///
    /// # Errors
    ///
    /// See [`Session::open`].
    pub fn open_with(
        fs: F,
        root: &Path,
        table: &Path,
        policy: SyncPolicy,
        settings: Settings,
    ) -> Result<Self> {
        let source_path = std::fs::canonicalize(table).unwrap_or_else(|_| table.to_path_buf());
        let table = read_table(table)?;
        let mut session = Self::build(fs, root, table.catalog, policy, settings)?;

        let stats = import_rows(&mut session.store, &table.rows);
        let width = session.store.catalog().len();
        let carried: Vec<(String, OneHot)> = table
            .rows
            .iter()
            .filter(|row| !session.store.contains_item(&row.item))
            .filter_map(|row| {
                OneHot::parse(row.digits.as_slice(), width)
                    .ok()
                    .filter(|digits| digits.count_ones() > 0)
                    .map(|digits| (row.item.clone(), digits))
            })
            .collect();
        if policy == SyncPolicy::Relocate && stats.imported > 0 {
            warn!(
                imported = stats.imported,
                "Imported labels are not applied to the folder tree; files stay where they are"
            );
        }
        info!(
            root = %session.root.display(),
            table = %table.path.display(),
            items = session.items.len(),
            imported = stats.imported,
            "Session opened"
        );
        session.import = Some(stats);
        session.source = Some(SourceTable {
            path: source_path,
            carried,
        });
        Ok(session)
    }

    fn build(
        fs: F,
        root: &Path,
        catalog: Catalog,
        policy: SyncPolicy,
        settings: Settings,
    ) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "input folder {} does not exist",
                root.display()
            )));
        }

        let items = scan_folder(root, &settings.extensions)?;
        if items.is_empty() {
            return Err(Error::NoItems {
                folder: root.to_path_buf(),
            });
        }

        let engine = SyncEngine::new(fs);
        engine.prepare(policy, root, &catalog)?;

        let store = AssignmentStore::new(catalog, items.iter().map(|i| i.name.clone()));
        Ok(Self {
            root: root.to_path_buf(),
            policy,
            settings,
            items,
            store,
            cursor: 0,
            engine,
            import: None,
            source: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────

    /// The input root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The session's policy.
    #[must_use]
    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    /// The assignment store.
    #[must_use]
    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    /// Items in sequence order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Stats of the table import this session was opened from.
    #[must_use]
    pub fn import_stats(&self) -> Option<&ImportStats> {
        self.import.as_ref()
    }

    /// 0-based cursor position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.cursor
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// A session always has at least one item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item under the cursor.
    #[must_use]
    pub fn current_item(&self) -> &Item {
        &self.items[self.cursor]
    }

    /// Where an item's file lives right now.
    #[must_use]
    pub fn display_path(&self, item: &Item) -> PathBuf {
        current_path(self.policy, &self.root, item, &self.store)
    }

    /// Catalog labels with their state for the current item.
    #[must_use]
    pub fn label_states(&self) -> Vec<LabelState> {
        self.store
            .label_states(&self.current_item().name)
            .into_iter()
            .enumerate()
            .map(|(i, (label, active))| LabelState {
                key: i + 1,
                label: label.to_string(),
                active,
            })
            .collect()
    }

    /// Snapshot for display.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let item = self.current_item();
        SessionStatus {
            position: self.cursor + 1,
            count: self.items.len(),
            item: item.name.clone(),
            path: self.display_path(item),
            policy: self.policy,
            labels: self.label_states(),
            labeled_items: self.store.labeled_count(),
        }
    }

    // ── Cursor ───────────────────────────────────────────────

    /// Move to the next item. Returns false on the last item.
    pub fn next(&mut self) -> bool {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous item. Returns false on the first item.
    pub fn prev(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a 1-based position.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the position is out of range.
    pub fn goto(&mut self, position: usize) -> Result<()> {
        if position == 0 || position > self.items.len() {
            return Err(Error::InvalidArgument(format!(
                "position {position} is outside 1..={}",
                self.items.len()
            )));
        }
        self.cursor = position - 1;
        Ok(())
    }

    // ── Labeling ─────────────────────────────────────────────

    /// Toggle a label on the current item and sync the folder tree.
    ///
    /// With `advance_on_label`, a successful toggle moves to the next item.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLabel` for labels outside the catalog, with the store
    /// unchanged. Returns `FileSystem` when the side effect fails, with the
    /// store change kept.
    pub fn toggle(&mut self, label: &str) -> Result<ToggleAction> {
        let item = &self.items[self.cursor];
        let action = self.store.toggle(&item.name, label)?;

        if let Err(e) = self
            .engine
            .apply(self.policy, &self.root, item, label, action, &self.store)
        {
            warn!(item = %item.name, label, %action, error = %e, "Label recorded but folder sync failed");
            return Err(e);
        }

        if self.settings.advance_on_label {
            self.next();
        }
        Ok(action)
    }

    /// Toggle the k-th catalog label (1-based).
    ///
    /// # Errors
    ///
    /// Returns `InvalidLabel` if no label has that key, plus the errors of
    /// [`Session::toggle`].
    pub fn toggle_key(&mut self, key: usize) -> Result<ToggleAction> {
        let label = self.label_for_key(key)?;
        self.toggle(&label)
    }

    fn label_for_key(&self, key: usize) -> Result<String> {
        key.checked_sub(1)
            .and_then(|i| self.store.catalog().get(i))
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidLabel {
                label: key.to_string(),
                similar: Vec::new(),
            })
    }

    // ── Export ───────────────────────────────────────────────

    /// Write the table to the explicit export location.
    ///
    /// # Errors
    ///
    /// Returns `FileSystem` if the table cannot be written.
    pub fn export_now(&self) -> Result<ExportStats> {
        self.export_to(&self.settings.export_path(&self.root))
    }

    /// Write the table to a given path.
    ///
    /// Writing over the table the session was opened from keeps that
    /// table's rows for items outside the folder.
    ///
    /// # Errors
    ///
    /// Returns `FileSystem` if the table cannot be written.
    pub fn export_to(&self, path: &Path) -> Result<ExportStats> {
        let carried: &[(String, OneHot)] = match &self.source {
            Some(source) if same_file(path, &source.path) => {
                debug!(
                    path = %path.display(),
                    rows = source.carried.len(),
                    "Export target is the source table, keeping rows for absent items"
                );
                source.carried.as_slice()
            }
            _ => &[],
        };
        write_table(path, &self.store, carried)
    }

    /// Best-effort export when the session ends.
    ///
    /// Failures are logged and swallowed so that closing never fails.
    pub fn export_on_termination(&self) -> Option<ExportStats> {
        let path = self.settings.auto_export_path(&self.root);
        match self.export_to(&path) {
            Ok(stats) => Some(stats),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Automatic export failed");
                None
            }
        }
    }

    // ── Dispatch ─────────────────────────────────────────────

    /// Route a command to the matching operation.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation.
    pub fn handle(&mut self, command: SessionCommand) -> Result<CommandOutcome> {
        match command {
            SessionCommand::Next => {
                let moved = self.next();
                Ok(self.moved(moved))
            }
            SessionCommand::Prev => {
                let moved = self.prev();
                Ok(self.moved(moved))
            }
            SessionCommand::Goto(position) => {
                let before = self.cursor;
                self.goto(position)?;
                Ok(self.moved(before != self.cursor))
            }
            SessionCommand::Toggle(label) => {
                let item = self.current_item().name.clone();
                let action = self.toggle(&label)?;
                Ok(CommandOutcome::Toggled { item, label, action })
            }
            SessionCommand::ToggleKey(key) => {
                let label = self.label_for_key(key)?;
                self.handle(SessionCommand::Toggle(label))
            }
            SessionCommand::Export => self.export_now().map(CommandOutcome::Exported),
            SessionCommand::Status => Ok(CommandOutcome::Status),
            SessionCommand::Quit => Ok(CommandOutcome::Ended {
                export: self.export_on_termination(),
            }),
        }
    }

    fn moved(&self, moved: bool) -> CommandOutcome {
        CommandOutcome::Moved {
            position: self.cursor + 1,
            moved,
        }
    }
}

fn same_file(path: &Path, canonical: &Path) -> bool {
    fs::canonicalize(path).is_ok_and(|p| p == canonical)
}
