//! File-backed persistence adapters.
//!
//! [`FileStore`] keeps one JSON document per identity in a directory and
//! guards them with in-process locks; the server is the only writer.
//! [`LocalStore`] keeps the single local save and guards it with a lock file
//! so two local processes cannot play the same save.

mod file;
mod local;

pub use file::FileStore;
pub use local::LocalStore;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use clicker_core::error::Result;
use clicker_core::save::{SaveDocument, SettingsSnapshot};
use clicker_core::simulation::SimulationState;
use tracing::info;

/// Read a save, creating a fresh one when the file does not exist.
/// Malformed contents fall back to a fresh game without touching the file.
fn read_or_create(path: &Path, owner: &str) -> Result<(SimulationState, SettingsSnapshot)> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(SaveDocument::decode_or_default(&text, owner)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let fresh = SaveDocument::default();
            write_atomic(path, &fresh.to_json()?)?;
            info!(owner = %owner, path = %path.display(), "Created new save");
            Ok(fresh.into_parts())
        }
        Err(e) => Err(e.into()),
    }
}

/// Serialize and write a save.
fn write_document(path: &Path, state: &SimulationState, settings: SettingsSnapshot) -> Result<()> {
    let json = SaveDocument::capture(state, settings).to_json()?;
    write_atomic(path, &json)?;
    Ok(())
}

/// Write to a sibling temp file, then rename over the target, so a crash
/// mid-write never leaves a truncated save.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);

    let mut file = fs::File::create(tmp)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, path)
}

/// Remove a file; a missing file is not an error.
fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
