//! Sync engine: keeps the folder tree and the table consistent with the
//! assignment store.
//!
//! - **Engine**: policy-driven copy/move/delete on each toggle
//! - **Table**: CSV export/import of the store
//! - **File ops**: the file-system collaborator and folder scan
//!
//! # Example
//!
//! ```ignore
//! use imgtag::sync::{SyncEngine, LocalFs, write_table};
//!
//! let engine = SyncEngine::new(LocalFs);
//! engine.prepare(policy, &root, store.catalog())?;
//!
//! let action = store.toggle("a.jpg", "cat")?;
//! engine.apply(policy, &root, &item, "cat", action, &store)?;
//!
//! let stats = write_table(&root.join("output/assigned_classes.csv"), &store, &[])?;
//! ```

mod engine;
mod file;
mod fs;
mod table;
mod types;

pub use engine::{current_path, label_path, SyncEngine};
pub use file::{atomic_write, file_size};
pub use fs::{has_extension, scan_folder, FileOps, LocalFs};
pub use table::{
    csv_escape, import_rows, read_table, parse_records, render_table, summarize, write_table,
    Table, TableRow, ITEM_COLUMN,
};
pub use types::{ExportStats, ImportStats, LabelCount, SkippedRow, TableSummary};
