use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use clicker_core::error::Result;
use clicker_core::identity::Identity;
use clicker_core::persistence::PersistenceAdapter;
use clicker_core::save::SettingsSnapshot;
use clicker_core::simulation::SimulationState;
use tracing::{debug, info};

use super::{read_or_create, remove_if_exists, write_document};

/// One JSON file per identity under a directory.
///
/// File names are the hex encoding of the storage key, so fingerprints with
/// `/` or `+` map to safe names. Locks live in memory: only this process
/// writes the directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    locks: Mutex<HashSet<String>>,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashSet::new()),
        }
    }

    /// Save directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the identity's save.
    #[must_use]
    pub fn path_for(&self, identity: &Identity) -> PathBuf {
        let key = identity.storage_key();
        let mut name = String::with_capacity(key.len() * 2 + 5);
        for byte in key.bytes() {
            let _ = write!(name, "{byte:02x}");
        }
        name.push_str(".json");
        self.dir.join(name)
    }

    fn locks(&self) -> MutexGuard<'_, HashSet<String>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistenceAdapter for FileStore {
    fn load_or_initialize(&self, identity: &Identity) -> Result<(SimulationState, SettingsSnapshot)> {
        read_or_create(&self.path_for(identity), &identity.redacted())
    }

    fn save(&self, identity: &Identity, state: &SimulationState, settings: SettingsSnapshot) -> Result<()> {
        write_document(&self.path_for(identity), state, settings)?;
        debug!(identity = %identity, "Saved");
        Ok(())
    }

    fn acquire_lock(&self, identity: &Identity) -> Result<bool> {
        Ok(self.locks().insert(identity.storage_key().to_string()))
    }

    fn release_lock(&self, identity: &Identity) -> Result<()> {
        self.locks().remove(identity.storage_key());
        Ok(())
    }

    fn delete(&self, identity: &Identity) -> Result<()> {
        remove_if_exists(&self.path_for(identity))?;
        info!(identity = %identity, "Deleted save");
        Ok(())
    }
}
