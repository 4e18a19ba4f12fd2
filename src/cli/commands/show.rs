//! Show command implementation.

use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::sync::{read_table, summarize};

/// Execute the show command: summarize an exported table.
///
/// # Errors
///
/// Returns `InvalidTable` if the table cannot be read.
pub fn execute(table: &Path, json: bool) -> Result<()> {
    let table = read_table(table)?;
    let summary = summarize(&table);

    if json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    println!("{}", summary.path.display().to_string().bold());
    println!("  Rows:   {}", summary.rows);
    println!("  Labels: {}", summary.labels.len());
    println!();

    let width = summary
        .counts
        .iter()
        .map(|c| c.label.len())
        .max()
        .unwrap_or(0);
    for count in &summary.counts {
        println!("  {:<width$}  {}", count.label, count.count);
    }

    if !summary.malformed.is_empty() {
        println!();
        println!(
            "{}",
            format!("{} rows would be skipped on import:", summary.malformed.len()).yellow()
        );
        for skipped in &summary.malformed {
            println!("  row {}: {} ({})", skipped.row, skipped.item, skipped.reason);
        }
    }
    Ok(())
}
