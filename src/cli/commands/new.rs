//! New session command implementation.

use std::path::Path;

use tracing::debug;

use crate::cli::commands::shell;
use crate::config::Settings;
use crate::error::Result;
use crate::model::SyncPolicy;
use crate::session::Session;
use crate::validate::split_labels;

/// Execute the new command: label a folder from scratch.
///
/// # Errors
///
/// Returns an error if the labels, mode, folder or config are invalid.
pub fn execute(
    folder: &Path,
    labels: &str,
    mode: &str,
    advance: bool,
    config: Option<&Path>,
    json: bool,
) -> Result<()> {
    let labels = split_labels(labels);
    let policy: SyncPolicy = mode.parse()?;

    let mut settings = Settings::resolve(config)?;
    settings.advance_on_label |= advance;
    debug!(?settings, "Resolved settings");

    let mut session = Session::create(folder, labels, policy, settings)?;
    shell::run_stdio(&mut session, json)
}
