//! Live sessions, indexed by id and by identity.
//!
//! At most one live session exists per identity. [`Registry::insert`] refuses
//! a second one; replacing a session means removing the old one first.

use std::collections::{BTreeMap, HashMap};

use clicker_core::identity::Identity;
use clicker_game::{Session, SessionId};

/// Session table owned by the hub.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: BTreeMap<SessionId, Session>,
    by_identity: HashMap<String, SessionId>,
    next_id: u64,
}

impl Registry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id. Ids are never reused.
    pub fn allocate_id(&mut self) -> SessionId {
        self.next_id += 1;
        SessionId(self.next_id)
    }

    /// The live session for an identity, if any.
    #[must_use]
    pub fn live_for(&self, identity: &Identity) -> Option<SessionId> {
        self.by_identity.get(identity.storage_key()).copied()
    }

    /// Install a session. Hands it back if its identity already has one.
    pub fn insert(&mut self, session: Session) -> Result<SessionId, Session> {
        let key = session.identity().storage_key().to_string();
        if self.by_identity.contains_key(&key) {
            return Err(session);
        }
        let id = session.id();
        self.by_identity.insert(key, id);
        self.sessions.insert(id, session);
        Ok(id)
    }

    /// Take a session out. Returns `None` if it was already removed.
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        let key = session.identity().storage_key();
        if self.by_identity.get(key) == Some(&id) {
            self.by_identity.remove(key);
        }
        Some(session)
    }

    /// Session by id.
    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Session by id.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// True if the id is live.
    #[must_use]
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// All live ids, in connection order.
    #[must_use]
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    /// The session map, for scheduler firings.
    pub fn sessions_mut(&mut self) -> &mut BTreeMap<SessionId, Session> {
        &mut self.sessions
    }

    /// Live session count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when nobody is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use clicker_core::persistence::MemoryStore;
    use clicker_game::terminal::MemorySink;
    use clicker_game::SessionConfig;
    use clicker_test_utils::fixtures::player;

    fn session(registry: &mut Registry, name: &str) -> Session {
        Session::new(
            registry.allocate_id(),
            player(name),
            Arc::new(MemoryStore::new()),
            Box::new(MemorySink::new()),
            (80, 24),
            SessionConfig::default(),
        )
    }

    #[test]
    fn test_one_session_per_identity() {
        let mut registry = Registry::new();
        let first = session(&mut registry, "alice");
        let second = session(&mut registry, "alice");
        let id = registry.insert(first).unwrap();

        let rejected = registry.insert(second).unwrap_err();
        assert_ne!(rejected.id(), id);
        assert_eq!(registry.live_for(&player("alice")), Some(id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_once() {
        let mut registry = Registry::new();
        let s = session(&mut registry, "bob");
        let id = registry.insert(s).unwrap();

        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert_eq!(registry.live_for(&player("bob")), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut registry = Registry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        assert!(b > a);
    }
}
