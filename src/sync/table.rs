//! Table export and import.
//!
//! # File Format
//!
//! Comma-separated UTF-8 text. One header row, then one row per labeled item:
//! ```text
//! item,cat,dog
//! a.jpg,0,1
//! b.jpg,1,1
//! ```
//! Header columns after the first are the catalog in order. Fields holding
//! commas or quotes are quoted with `"` and inner quotes doubled.
//!
//! Export omits items with no labels. Import keys rows by item name, so
//! row order does not matter; rows naming items that are not in the folder
//! are skipped, and malformed rows are collected and reported at the end.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{Error, FsOp, Result};
use crate::model::Catalog;
use crate::store::{AssignmentStore, OneHot};
use crate::sync::file::{atomic_write, file_size};
use crate::sync::types::{ExportStats, ImportStats, LabelCount, SkippedRow, TableSummary};

/// Name of the first header column.
pub const ITEM_COLUMN: &str = "item";

/// Escape a value for CSV output (wrap in quotes if it contains commas, quotes, or newlines).
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Split table text into records, honoring quoted fields.
///
/// Quoted fields may span line breaks. Each record carries the line it
/// starts on (1-indexed). Blank lines produce no record.
#[must_use]
pub fn parse_records(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut line = 1;
    let mut start = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => {
                in_quotes = true;
                quoted = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes && matches!(chars.peek(), Some('\n') | None) => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, start, std::mem::take(&mut fields), quoted);
                quoted = false;
                line += 1;
                start = line;
            }
            '\n' => {
                field.push(c);
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        warn!(line = start, "Unterminated quoted field at end of table");
    }
    if quoted || !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, start, fields, quoted);
    }
    records
}

fn push_record(
    records: &mut Vec<(usize, Vec<String>)>,
    line: usize,
    fields: Vec<String>,
    quoted: bool,
) {
    let blank = !quoted && fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push((line, fields));
    }
}

/// Render the store as table text.
///
/// `carried` rows are appended after the store's rows; they hold labels of
/// items outside the current folder. Returns the text and the number of
/// rows written.
#[must_use]
pub fn render_table(store: &AssignmentStore, carried: &[(String, OneHot)]) -> (String, usize) {
    let mut out = String::new();

    let header: Vec<String> = std::iter::once(ITEM_COLUMN)
        .chain(store.catalog().iter())
        .map(csv_escape)
        .collect();
    out.push_str(&header.join(","));
    out.push('\n');

    let mut rows = 0;
    let labeled = store
        .export_rows()
        .filter(|(_, digits)| digits.count_ones() > 0);
    let carried = carried
        .iter()
        .filter(|(_, digits)| digits.count_ones() > 0)
        .map(|(item, digits)| (item.as_str(), digits.clone()));
    for (item, digits) in labeled.chain(carried) {
        out.push_str(&csv_escape(item));
        out.push(',');
        out.push_str(&digits.to_string());
        out.push('\n');
        rows += 1;
    }

    (out, rows)
}

/// Write the store to a table file atomically.
///
/// # Errors
///
/// Returns `Error::FileSystem` if the folder or file cannot be written.
pub fn write_table(
    path: &Path,
    store: &AssignmentStore,
    carried: &[(String, OneHot)],
) -> Result<ExportStats> {
    let (content, rows) = render_table(store, carried);
    atomic_write(path, &content)?;

    let stats = ExportStats {
        path: path.to_path_buf(),
        rows,
        carried: rows - store.labeled_count(),
        omitted: store.items().len() - store.labeled_count(),
        bytes: file_size(path),
        exported_at: Utc::now().to_rfc3339(),
    };
    info!(path = %path.display(), rows, carried = stats.carried, "Exported table");
    Ok(stats)
}

/// One data row as read from disk, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Line number (1-indexed, header is line 1).
    pub line: usize,
    /// Item name from the first column.
    pub item: String,
    /// Remaining fields.
    pub digits: Vec<String>,
}

/// A parsed table: catalog from the header plus raw rows.
#[derive(Debug, Clone)]
pub struct Table {
    pub path: PathBuf,
    pub catalog: Catalog,
    pub rows: Vec<TableRow>,
}

/// Read a table, recovering the catalog from its header.
///
/// Blank lines are ignored. Row contents are validated on import.
///
/// # Errors
///
/// Returns `Error::FileSystem` if the file cannot be read and
/// `Error::InvalidTable` if the header is missing or does not form a catalog.
pub fn read_table(path: &Path) -> Result<Table> {
    let content = fs::read_to_string(path).map_err(|e| Error::fs(FsOp::Read, path, e))?;
    let invalid = |reason: String| Error::InvalidTable {
        path: path.to_path_buf(),
        reason,
    };

    let text = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let mut records = parse_records(text).into_iter();

    let (_, header) = records
        .next()
        .ok_or_else(|| invalid("file is empty".to_string()))?;
    if header.len() < 2 {
        return Err(invalid("header has no label columns".to_string()));
    }
    let catalog = Catalog::new(header[1..].to_vec()).map_err(|e| invalid(e.to_string()))?;

    let rows = records
        .map(|(line, fields)| {
            let mut fields = fields.into_iter();
            let item = fields.next().unwrap_or_default();
            TableRow {
                line,
                item,
                digits: fields.collect(),
            }
        })
        .collect();

    Ok(Table {
        path: path.to_path_buf(),
        catalog,
        rows,
    })
}

/// Apply table rows to a store, bypassing sync side effects.
///
/// Rows for items outside the store's sequence are skipped silently.
/// Malformed rows do not abort the import; they are collected in the stats.
pub fn import_rows(store: &mut AssignmentStore, rows: &[TableRow]) -> ImportStats {
    let mut stats = ImportStats {
        rows: rows.len(),
        ..ImportStats::default()
    };

    for row in rows {
        if !store.contains_item(&row.item) {
            debug!(item = %row.item, line = row.line, "Item not on disk, skipping row");
            stats.not_on_disk += 1;
            continue;
        }

        match store.import_row(row.line, &row.item, row.digits.as_slice()) {
            Ok(()) => stats.imported += 1,
            Err(Error::MalformedRow { row: line, reason }) => {
                warn!(item = %row.item, line, %reason, "Skipping malformed row");
                stats.malformed.push(SkippedRow {
                    row: line,
                    item: row.item.clone(),
                    reason,
                });
            }
            Err(e) => {
                warn!(item = %row.item, line = row.line, error = %e, "Skipping row");
                stats.malformed.push(SkippedRow {
                    row: row.line,
                    item: row.item.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        imported = stats.imported,
        not_on_disk = stats.not_on_disk,
        malformed = stats.malformed.len(),
        "Imported table"
    );
    stats
}

/// Summarize a table: catalog, row count, and per-label totals.
#[must_use]
pub fn summarize(table: &Table) -> TableSummary {
    let mut counts = vec![0usize; table.catalog.len()];
    let mut malformed = Vec::new();

    for row in &table.rows {
        match OneHot::parse(row.digits.as_slice(), table.catalog.len()) {
            Ok(one_hot) => {
                for (count, &set) in counts.iter_mut().zip(one_hot.as_slice()) {
                    *count += usize::from(set);
                }
            }
            Err(reason) => malformed.push(SkippedRow {
                row: row.line,
                item: row.item.clone(),
                reason,
            }),
        }
    }

    TableSummary {
        path: table.path.clone(),
        labels: table.catalog.labels().to_vec(),
        rows: table.rows.len(),
        counts: table
            .catalog
            .iter()
            .zip(counts)
            .map(|(label, count)| LabelCount {
                label: label.to_string(),
                count,
            })
            .collect(),
        malformed,
    }
}
