//! Scan command implementation.

use std::path::Path;

use serde::Serialize;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::sync::scan_folder;

#[derive(Serialize)]
struct ScanOutput<'a> {
    folder: &'a Path,
    count: usize,
    items: Vec<&'a str>,
}

/// Execute the scan command: list the images a session would see.
///
/// # Errors
///
/// Returns `NoItems` if the folder has no recognized images.
pub fn execute(folder: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let settings = Settings::resolve(config)?;
    let items = scan_folder(folder, &settings.extensions)?;
    if items.is_empty() {
        return Err(Error::NoItems {
            folder: folder.to_path_buf(),
        });
    }

    if json {
        let output = ScanOutput {
            folder,
            count: items.len(),
            items: items.iter().map(|i| i.name.as_str()).collect(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    for (i, item) in items.iter().enumerate() {
        println!("{:>5}  {}", i + 1, item.name);
    }
    println!();
    println!("{} images in {}", items.len(), folder.display());
    Ok(())
}
