//! Tick and frame loops over the registered sessions.
//!
//! The scheduler keeps two independent membership sets, one per loop, and an
//! autosave clock. It does not own sessions or timers: the hub drives it at
//! the configured rates and hands it the session map for each firing.
//!
//! Each session call runs under `catch_unwind`. A session that panics is
//! reported back to the caller and the firing carries on with the rest.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use clicker_game::{Session, SessionError, SessionId};
use tracing::{debug, error, info, warn};

/// What the loops need from a session.
pub trait Scheduled {
    /// Advance one simulation tick.
    fn tick(&mut self);

    /// Present one frame. Returns bytes written.
    fn render(&mut self) -> Result<usize, SessionError>;

    /// Persist progress.
    fn autosave(&self) -> Result<(), SessionError>;
}

impl Scheduled for Session {
    fn tick(&mut self) {
        Session::tick(self);
    }

    fn render(&mut self) -> Result<usize, SessionError> {
        Session::render(self)
    }

    fn autosave(&self) -> Result<(), SessionError> {
        self.save()
    }
}

/// One fixed-rate loop's membership.
#[derive(Debug, Default)]
struct LoopSet {
    members: BTreeSet<SessionId>,
}

impl LoopSet {
    /// Ids present in both the set and the map, in order. Taken before the
    /// firing so membership changes never disturb an iteration.
    fn snapshot<S>(&self, sessions: &BTreeMap<SessionId, S>) -> Vec<SessionId> {
        self.members
            .iter()
            .filter(|id| sessions.contains_key(id))
            .copied()
            .collect()
    }
}

/// Outcome of one firing.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Firing {
    /// Sessions invoked.
    pub visited: usize,
    /// Sessions that returned an error.
    pub failed: Vec<SessionId>,
    /// Sessions that panicked and must be torn down.
    pub panicked: Vec<SessionId>,
}

/// Ticker, renderer and autosave clock.
#[derive(Debug)]
pub struct Scheduler {
    ticker: LoopSet,
    renderer: LoopSet,
    autosave_every: Option<Duration>,
    last_autosave: Instant,
}

impl Scheduler {
    /// Scheduler that autosaves every `autosave_every`, or never.
    #[must_use]
    pub fn new(autosave_every: Option<Duration>, now: Instant) -> Self {
        Self {
            ticker: LoopSet::default(),
            renderer: LoopSet::default(),
            autosave_every,
            last_autosave: now,
        }
    }

    /// Add a session to both loops.
    pub fn register(&mut self, id: SessionId) {
        self.ticker.members.insert(id);
        self.renderer.members.insert(id);
        debug!(session = %id, "Registered with scheduler");
    }

    /// Remove a session from both loops. Unknown ids are ignored.
    pub fn unregister(&mut self, id: SessionId) {
        let ticked = self.ticker.members.remove(&id);
        let rendered = self.renderer.members.remove(&id);
        if ticked || rendered {
            debug!(session = %id, "Unregistered from scheduler");
        }
    }

    /// True if the session is in either loop.
    #[must_use]
    pub fn is_registered(&self, id: SessionId) -> bool {
        self.ticker.members.contains(&id) || self.renderer.members.contains(&id)
    }

    /// Number of sessions in the tick loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ticker.members.len()
    }

    /// True when no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticker.members.is_empty() && self.renderer.members.is_empty()
    }

    /// Tick every registered session.
    pub fn fire_ticks<S: Scheduled>(&self, sessions: &mut BTreeMap<SessionId, S>) -> Firing {
        let mut firing = Firing::default();
        for id in self.ticker.snapshot(sessions) {
            let Some(session) = sessions.get_mut(&id) else {
                continue;
            };
            firing.visited += 1;
            if panic::catch_unwind(AssertUnwindSafe(|| session.tick())).is_err() {
                error!(session = %id, "Session panicked during tick");
                firing.panicked.push(id);
            }
        }
        firing
    }

    /// Render every registered session.
    pub fn fire_frames<S: Scheduled>(&self, sessions: &mut BTreeMap<SessionId, S>) -> Firing {
        let mut firing = Firing::default();
        for id in self.renderer.snapshot(sessions) {
            let Some(session) = sessions.get_mut(&id) else {
                continue;
            };
            firing.visited += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| session.render())) {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    debug!(session = %id, error = %e, "Render failed");
                    firing.failed.push(id);
                }
                Err(_) => {
                    error!(session = %id, "Session panicked during render");
                    firing.panicked.push(id);
                }
            }
        }
        firing
    }

    /// True when an autosave is enabled and its interval has passed.
    #[must_use]
    pub fn autosave_due(&self, now: Instant) -> bool {
        self.autosave_every
            .is_some_and(|every| now.saturating_duration_since(self.last_autosave) >= every)
    }

    /// Save every registered session if the interval has passed. Returns
    /// `None` when no autosave was due.
    pub fn autosave_if_due<S: Scheduled>(
        &mut self,
        sessions: &mut BTreeMap<SessionId, S>,
        now: Instant,
    ) -> Option<Firing> {
        if !self.autosave_due(now) {
            return None;
        }
        self.last_autosave = now;

        let mut firing = Firing::default();
        for id in self.ticker.snapshot(sessions) {
            let Some(session) = sessions.get(&id) else {
                continue;
            };
            firing.visited += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| session.autosave())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(session = %id, error = %e, "Autosave failed");
                    firing.failed.push(id);
                }
                Err(_) => {
                    error!(session = %id, "Session panicked during autosave");
                    firing.panicked.push(id);
                }
            }
        }
        info!(sessions = firing.visited, failed = firing.failed.len(), "Autosaved");
        Some(firing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Fake {
        ticks: u32,
        frames: u32,
        saves: Cell<u32>,
        panic_on_tick: bool,
        fail_render: bool,
    }

    impl Scheduled for Fake {
        fn tick(&mut self) {
            assert!(!self.panic_on_tick, "tick exploded");
            self.ticks += 1;
        }

        fn render(&mut self) -> Result<usize, SessionError> {
            if self.fail_render {
                return Err(SessionError::Closed("gone".into()));
            }
            self.frames += 1;
            Ok(1)
        }

        fn autosave(&self) -> Result<(), SessionError> {
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }
    }

    fn sessions(n: u64) -> (Scheduler, BTreeMap<SessionId, Fake>) {
        let mut scheduler = Scheduler::new(Some(Duration::from_secs(60)), Instant::now());
        let mut map = BTreeMap::new();
        for i in 0..n {
            scheduler.register(SessionId(i));
            map.insert(SessionId(i), Fake::default());
        }
        (scheduler, map)
    }

    #[test]
    fn test_panicking_session_does_not_stop_others() {
        let (scheduler, mut map) = sessions(3);
        map.get_mut(&SessionId(1)).unwrap().panic_on_tick = true;

        let firing = scheduler.fire_ticks(&mut map);
        assert_eq!(firing.visited, 3);
        assert_eq!(firing.panicked, vec![SessionId(1)]);
        assert_eq!(map[&SessionId(0)].ticks, 1);
        assert_eq!(map[&SessionId(2)].ticks, 1);
    }

    #[test]
    fn test_render_errors_are_reported() {
        let (scheduler, mut map) = sessions(2);
        map.get_mut(&SessionId(0)).unwrap().fail_render = true;
        let firing = scheduler.fire_frames(&mut map);
        assert_eq!(firing.failed, vec![SessionId(0)]);
        assert_eq!(map[&SessionId(1)].frames, 1);
    }

    #[test]
    fn test_unregistered_sessions_are_skipped() {
        let (mut scheduler, mut map) = sessions(2);
        scheduler.unregister(SessionId(0));
        assert!(!scheduler.is_registered(SessionId(0)));

        scheduler.fire_ticks(&mut map);
        scheduler.fire_frames(&mut map);
        assert_eq!(map[&SessionId(0)].ticks, 0);
        assert_eq!(map[&SessionId(0)].frames, 0);
        assert_eq!(map[&SessionId(1)].ticks, 1);
    }

    #[test]
    fn test_registered_but_missing_is_ignored() {
        let (mut scheduler, mut map) = sessions(1);
        scheduler.register(SessionId(9));
        assert_eq!(scheduler.fire_ticks(&mut map).visited, 1);
    }

    #[test]
    fn test_autosave_interval() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(Some(Duration::from_secs(60)), start);
        let mut map = BTreeMap::new();
        scheduler.register(SessionId(0));
        map.insert(SessionId(0), Fake::default());

        assert!(scheduler
            .autosave_if_due(&mut map, start + Duration::from_secs(59))
            .is_none());
        let firing = scheduler
            .autosave_if_due(&mut map, start + Duration::from_secs(60))
            .unwrap();
        assert_eq!(firing.visited, 1);
        assert_eq!(map[&SessionId(0)].saves.get(), 1);

        // The clock restarts from the last save.
        assert!(!scheduler.autosave_due(start + Duration::from_secs(100)));
        assert!(scheduler.autosave_due(start + Duration::from_secs(120)));
    }

    #[test]
    fn test_autosave_disabled() {
        let scheduler = Scheduler::new(None, Instant::now());
        assert!(!scheduler.autosave_due(Instant::now() + Duration::from_secs(3600)));
    }
}
