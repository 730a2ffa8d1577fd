use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use clicker_core::error::{GameError, Result};
use clicker_core::identity::Identity;
use clicker_core::persistence::PersistenceAdapter;
use clicker_core::save::SettingsSnapshot;
use clicker_core::simulation::SimulationState;
use tracing::{debug, info, warn};

use super::{read_or_create, remove_if_exists, write_document};

/// The single save used when playing locally.
///
/// The lock is a sibling file (`save.json.lock`) holding the owning process
/// id. A lock whose process no longer exists is taken over.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    lock_path: PathBuf,
    held: AtomicBool,
}

impl LocalStore {
    /// Store for the save at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.as_os_str().to_owned();
        lock_name.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_name),
            held: AtomicBool::new(false),
        }
    }

    /// Save file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock file.
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn try_create_lock(&self) -> io::Result<bool> {
        if let Some(parent) = self.lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        match OpenOptions::new().write(true).create_new(true).open(&self.lock_path) {
            Ok(mut file) => {
                write!(file, "{}", std::process::id())?;
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Owner of an existing lock, if it is still running.
    fn live_owner(&self) -> io::Result<Option<u32>> {
        let text = match fs::read_to_string(&self.lock_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let Ok(pid) = text.trim().parse::<u32>() else {
            warn!(path = %self.lock_path.display(), "Lock file is unreadable, treating as stale");
            return Ok(None);
        };
        Ok(process_alive(pid).then_some(pid))
    }
}

impl PersistenceAdapter for LocalStore {
    fn load_or_initialize(&self, identity: &Identity) -> Result<(SimulationState, SettingsSnapshot)> {
        read_or_create(&self.path, &identity.redacted())
    }

    fn save(&self, _identity: &Identity, state: &SimulationState, settings: SettingsSnapshot) -> Result<()> {
        write_document(&self.path, state, settings)?;
        debug!(path = %self.path.display(), "Saved");
        Ok(())
    }

    fn acquire_lock(&self, _identity: &Identity) -> Result<bool> {
        if self.held.load(Ordering::SeqCst) {
            return Ok(false);
        }
        if !self.try_create_lock()? {
            if let Some(pid) = self.live_owner()? {
                if pid != std::process::id() {
                    warn!(pid, path = %self.path.display(), "Save is in use by another process");
                    return Ok(false);
                }
            }
            info!(path = %self.lock_path.display(), "Reclaiming stale lock");
            remove_if_exists(&self.lock_path)?;
            if !self.try_create_lock()? {
                return Err(GameError::SaveLocked(self.path.display().to_string()));
            }
        }
        self.held.store(true, Ordering::SeqCst);
        Ok(true)
    }

    fn release_lock(&self, _identity: &Identity) -> Result<()> {
        if self.held.swap(false, Ordering::SeqCst) {
            remove_if_exists(&self.lock_path)?;
        }
        Ok(())
    }

    fn delete(&self, _identity: &Identity) -> Result<()> {
        remove_if_exists(&self.path)?;
        info!(path = %self.path.display(), "Deleted save");
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

// Without /proc there is no portable check, so a lock is only reclaimed when
// it names this process.
#[cfg(not(target_os = "linux"))]
fn process_alive(pid: u32) -> bool {
    pid != std::process::id()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("save.json"));
        (dir, store)
    }

    #[test]
    fn test_lock_file_holds_pid() {
        let (_dir, store) = store();
        assert!(store.acquire_lock(&Identity::Anonymous).unwrap());
        let text = fs::read_to_string(store.lock_path()).unwrap();
        assert_eq!(text, std::process::id().to_string());

        store.release_lock(&Identity::Anonymous).unwrap();
        assert!(!store.lock_path().exists());
    }

    #[test]
    fn test_acquire_twice_refused() {
        let (_dir, store) = store();
        assert!(store.acquire_lock(&Identity::Anonymous).unwrap());
        assert!(!store.acquire_lock(&Identity::Anonymous).unwrap());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_live_foreign_lock_refused() {
        let (_dir, store) = store();
        // pid 1 always exists on Linux.
        fs::write(store.lock_path(), "1").unwrap();
        assert!(!store.acquire_lock(&Identity::Anonymous).unwrap());
        assert_eq!(fs::read_to_string(store.lock_path()).unwrap(), "1");
    }

    #[test]
    fn test_stale_lock_reclaimed() {
        let (_dir, store) = store();
        fs::write(store.lock_path(), "not a pid").unwrap();
        assert!(store.acquire_lock(&Identity::Anonymous).unwrap());
        assert_eq!(
            fs::read_to_string(store.lock_path()).unwrap(),
            std::process::id().to_string()
        );
    }

    #[test]
    fn test_release_without_lock_keeps_foreign_file() {
        let (_dir, store) = store();
        fs::write(store.lock_path(), "1").unwrap();
        store.release_lock(&Identity::Anonymous).unwrap();
        assert!(store.lock_path().exists());
    }

    #[test]
    fn test_malformed_save_starts_fresh() {
        let (_dir, store) = store();
        fs::write(store.path(), "{ not json").unwrap();
        let (state, _) = store.load_or_initialize(&Identity::Anonymous).unwrap();
        assert_eq!(state.prestige(), 0);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_delete_removes_save() {
        let (_dir, store) = store();
        store.load_or_initialize(&Identity::Anonymous).unwrap();
        assert!(store.path().exists());
        store.delete(&Identity::Anonymous).unwrap();
        assert!(!store.path().exists());
    }
}
