//! Sync types for table export/import.

use std::path::PathBuf;

use serde::Serialize;

/// Statistics for an export operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportStats {
    /// Where the table was written.
    pub path: PathBuf,
    /// Number of data rows written (labeled items).
    pub rows: usize,
    /// Rows kept from the source table for items outside the folder.
    pub carried: usize,
    /// Number of items left out because they have no labels.
    pub omitted: usize,
    /// Size of the written table in bytes.
    pub bytes: u64,
    /// RFC 3339 timestamp of the export.
    pub exported_at: String,
}

/// A data row that import could not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Line number in the table (1-indexed, header is line 1).
    pub row: usize,
    /// Item name from the first column.
    pub item: String,
    /// Why the row was skipped.
    pub reason: String,
}

/// Statistics for an import operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    /// Data rows read from the table.
    pub rows: usize,
    /// Rows applied to the store.
    pub imported: usize,
    /// Rows whose item is not present in the folder (silently skipped).
    pub not_on_disk: usize,
    /// Rows rejected as malformed, reported after the whole table was read.
    pub malformed: Vec<SkippedRow>,
}

impl ImportStats {
    /// Returns true if every row was either applied or legitimately absent.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }
}

/// Per-label totals of a table.
#[derive(Debug, Clone, Serialize)]
pub struct LabelCount {
    /// Label name.
    pub label: String,
    /// Rows with a `1` in this label's column.
    pub count: usize,
}

/// Summary of a table on disk, without a session.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    /// Table path.
    pub path: PathBuf,
    /// Labels recovered from the header.
    pub labels: Vec<String>,
    /// Data rows.
    pub rows: usize,
    /// Totals in catalog order.
    pub counts: Vec<LabelCount>,
    /// Rows that would be rejected on import.
    pub malformed: Vec<SkippedRow>,
}
