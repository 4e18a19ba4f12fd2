//! Version command implementation.

use std::path::Path;

use crate::config::resolve_config_path;
use crate::error::Result;
use crate::model::SyncPolicy;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    modes: Vec<&'a str>,
    config: Option<String>,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(config: Option<&Path>, json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };
    let config = resolve_config_path(config).map(|p| p.display().to_string());

    if json {
        let output = VersionOutput {
            version,
            build,
            modes: SyncPolicy::ALL.iter().map(SyncPolicy::as_str).collect(),
            config,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("imgtag version {version} ({build})");
    if let Some(path) = config {
        println!("  Config: {path}");
    }
    Ok(())
}
