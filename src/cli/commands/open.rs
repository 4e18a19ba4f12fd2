//! Open session command implementation.

use std::path::Path;

use colored::Colorize;
use tracing::debug;

use crate::cli::commands::shell;
use crate::config::Settings;
use crate::error::Result;
use crate::model::SyncPolicy;
use crate::session::Session;
use crate::sync::ImportStats;

/// Execute the open command: resume labeling from an exported table.
///
/// # Errors
///
/// Returns an error if the table, mode, folder or config are invalid.
pub fn execute(
    folder: &Path,
    table: &Path,
    mode: &str,
    advance: bool,
    config: Option<&Path>,
    json: bool,
) -> Result<()> {
    let policy: SyncPolicy = mode.parse()?;

    let mut settings = Settings::resolve(config)?;
    settings.advance_on_label |= advance;
    debug!(?settings, "Resolved settings");

    let mut session = Session::open(folder, table, policy, settings)?;
    if let Some(stats) = session.import_stats() {
        report_import(stats, json)?;
    }
    shell::run_stdio(&mut session, json)
}

fn report_import(stats: &ImportStats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "import": stats }));
        return Ok(());
    }

    println!(
        "Imported {} of {} rows ({} not in folder)",
        stats.imported, stats.rows, stats.not_on_disk
    );
    if !stats.is_clean() {
        println!(
            "{}",
            format!("  {} malformed rows skipped", stats.malformed.len()).yellow()
        );
        for skipped in &stats.malformed {
            println!("    row {}: {} ({})", skipped.row, skipped.item, skipped.reason);
        }
    }
    Ok(())
}
