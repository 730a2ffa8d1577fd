//! Persistence adapter interface.
//!
//! Sessions talk to storage only through [`PersistenceAdapter`]. The
//! file-backed adapters live in the server crate; [`MemoryStore`] here backs
//! tests and records a journal of every call so ordering can be asserted.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::error::{GameError, Result};
use crate::identity::Identity;
use crate::save::SaveDocument;
use crate::simulation::SimulationState;

pub use crate::save::SettingsSnapshot;

/// Storage contract consumed by sessions and the connection acceptor.
///
/// Implementations must tolerate malformed stored payloads by logging and
/// returning a fresh state.
pub trait PersistenceAdapter: Send + Sync {
    /// Load the identity's progress, creating a fresh record if none exists.
    fn load_or_initialize(&self, identity: &Identity) -> Result<(SimulationState, SettingsSnapshot)>;

    /// Persist progress and settings.
    fn save(&self, identity: &Identity, state: &SimulationState, settings: SettingsSnapshot) -> Result<()>;

    /// Take the advisory lock. `Ok(false)` means someone else holds it.
    fn acquire_lock(&self, identity: &Identity) -> Result<bool>;

    /// Release the advisory lock. Releasing an unheld lock is a no-op.
    fn release_lock(&self, identity: &Identity) -> Result<()>;

    /// Remove everything stored for the identity.
    fn delete(&self, identity: &Identity) -> Result<()>;
}

/// One call observed by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// `load_or_initialize` for the key.
    Loaded(String),
    /// `save` for the key.
    Saved(String),
    /// `acquire_lock` succeeded.
    Acquired(String),
    /// `acquire_lock` found the lock held.
    Refused(String),
    /// `release_lock` for the key.
    Released(String),
    /// `delete` for the key.
    Deleted(String),
}

#[derive(Debug, Default)]
struct MemoryInner {
    documents: HashMap<String, String>,
    locks: HashSet<String>,
    journal: Vec<StoreEvent>,
    fail_saves: bool,
}

/// In-memory adapter storing serialized documents, with a call journal.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn journal(&self) -> Vec<StoreEvent> {
        self.inner().journal.clone()
    }

    /// Raw stored document for a key.
    #[must_use]
    pub fn document(&self, key: &str) -> Option<String> {
        self.inner().documents.get(key).cloned()
    }

    /// Store a raw payload, e.g. a corrupt one.
    pub fn put_raw(&self, key: &str, payload: &str) {
        self.inner()
            .documents
            .insert(key.to_string(), payload.to_string());
    }

    /// Whether the key's lock is held.
    #[must_use]
    pub fn is_locked(&self, key: &str) -> bool {
        self.inner().locks.contains(key)
    }

    /// Make subsequent saves fail with a storage error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.inner().fail_saves = fail;
    }
}

impl PersistenceAdapter for MemoryStore {
    fn load_or_initialize(&self, identity: &Identity) -> Result<(SimulationState, SettingsSnapshot)> {
        let key = identity.storage_key().to_string();
        let mut inner = self.inner();
        inner.journal.push(StoreEvent::Loaded(key.clone()));

        let Some(text) = inner.documents.get(&key).cloned() else {
            let fresh = SaveDocument::default();
            inner.documents.insert(key, fresh.to_json()?);
            info!(identity = %identity, "Initialized new save");
            return Ok(fresh.into_parts());
        };
        drop(inner);
        Ok(SaveDocument::decode_or_default(&text, &identity.redacted()))
    }

    fn save(&self, identity: &Identity, state: &SimulationState, settings: SettingsSnapshot) -> Result<()> {
        let key = identity.storage_key().to_string();
        let mut inner = self.inner();
        if inner.fail_saves {
            return Err(GameError::Storage("save rejected".to_string()));
        }
        let text = SaveDocument::capture(state, settings).to_json()?;
        inner.documents.insert(key.clone(), text);
        inner.journal.push(StoreEvent::Saved(key));
        Ok(())
    }

    fn acquire_lock(&self, identity: &Identity) -> Result<bool> {
        let key = identity.storage_key().to_string();
        let mut inner = self.inner();
        if inner.locks.insert(key.clone()) {
            inner.journal.push(StoreEvent::Acquired(key));
            Ok(true)
        } else {
            debug!(identity = %identity, "Lock already held");
            inner.journal.push(StoreEvent::Refused(key));
            Ok(false)
        }
    }

    fn release_lock(&self, identity: &Identity) -> Result<()> {
        let key = identity.storage_key().to_string();
        let mut inner = self.inner();
        inner.locks.remove(&key);
        inner.journal.push(StoreEvent::Released(key));
        Ok(())
    }

    fn delete(&self, identity: &Identity) -> Result<()> {
        let key = identity.storage_key().to_string();
        let mut inner = self.inner();
        inner.documents.remove(&key);
        inner.journal.push(StoreEvent::Deleted(key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WorkerId;
    use crate::math::Bytes;

    fn alice() -> Identity {
        Identity::key("SHA256:alice", "alice")
    }

    #[test]
    fn test_lock_is_exclusive() {
        let store = MemoryStore::new();
        assert!(store.acquire_lock(&alice()).unwrap());
        assert!(!store.acquire_lock(&alice()).unwrap());
        store.release_lock(&alice()).unwrap();
        assert!(store.acquire_lock(&alice()).unwrap());
    }

    #[test]
    fn test_load_creates_then_reads_back() {
        let store = MemoryStore::new();
        let (mut state, settings) = store.load_or_initialize(&alice()).unwrap();
        assert!(store.document("SHA256:alice").is_some());

        state.set_bytes(Bytes::from(10u32));
        state.buy_worker(WorkerId::Intern).unwrap();
        store.save(&alice(), &state, settings).unwrap();

        let (loaded, _) = store.load_or_initialize(&alice()).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_corrupt_document_loads_fresh() {
        let store = MemoryStore::new();
        store.put_raw("SHA256:alice", "][");
        let (state, _) = store.load_or_initialize(&alice()).unwrap();
        assert_eq!(state, SimulationState::new());
    }

    #[test]
    fn test_journal_order() {
        let store = MemoryStore::new();
        store.acquire_lock(&alice()).unwrap();
        store.load_or_initialize(&alice()).unwrap();
        store.release_lock(&alice()).unwrap();
        let key = "SHA256:alice".to_string();
        assert_eq!(
            store.journal(),
            vec![
                StoreEvent::Acquired(key.clone()),
                StoreEvent::Loaded(key.clone()),
                StoreEvent::Released(key),
            ]
        );
    }
}
