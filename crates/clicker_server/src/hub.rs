//! The task that owns every session.
//!
//! Transports never touch a [`Session`] directly. They send [`HubEvent`]s
//! through a [`HubHandle`]; the hub applies them one at a time between tick
//! and frame firings, so session state needs no locks.
//!
//! Persistence calls are synchronous. When an identity connects while it
//! already has a live session, the old session is destroyed (saved, lock
//! released, terminal restored, notice sent, stream closed) before the new
//! one takes the lock.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clicker_core::identity::Identity;
use clicker_core::persistence::PersistenceAdapter;
use clicker_game::terminal::Sink;
use clicker_game::{Farewell, InputOutcome, Session, SessionConfig, SessionError, SessionId};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::registry::Registry;
use crate::scheduler::{Firing, Scheduler};

/// Something a transport wants the hub to do.
pub enum HubEvent {
    /// A client is ready to play.
    Connect {
        /// Who connected.
        identity: Identity,
        /// Where the session's output goes.
        sink: Box<dyn Sink>,
        /// Initial terminal size.
        size: (u16, u16),
        /// Receives the new session's id, or the reason it was refused.
        reply: oneshot::Sender<std::result::Result<SessionId, String>>,
    },
    /// Bytes typed by the client.
    Input {
        /// Target session.
        id: SessionId,
        /// Raw bytes.
        bytes: Vec<u8>,
    },
    /// The client's terminal changed size.
    Resize {
        /// Target session.
        id: SessionId,
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// The stream closed.
    Disconnect {
        /// Session that lost its client.
        id: SessionId,
    },
}

impl std::fmt::Debug for HubEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect { identity, size, .. } => f
                .debug_struct("Connect")
                .field("identity", &identity.redacted())
                .field("size", size)
                .finish_non_exhaustive(),
            Self::Input { id, bytes } => f
                .debug_struct("Input")
                .field("id", id)
                .field("len", &bytes.len())
                .finish(),
            Self::Resize { id, width, height } => f
                .debug_struct("Resize")
                .field("id", id)
                .field("width", width)
                .field("height", height)
                .finish(),
            Self::Disconnect { id } => f.debug_struct("Disconnect").field("id", id).finish(),
        }
    }
}

/// Cloneable sender for [`HubEvent`]s.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubEvent>,
}

impl HubHandle {
    /// Ask the hub to start a session and wait for the answer.
    pub async fn connect(&self, identity: Identity, sink: Box<dyn Sink>, size: (u16, u16)) -> Result<SessionId> {
        let (reply, answer) = oneshot::channel();
        self.send(HubEvent::Connect {
            identity,
            sink,
            size,
            reply,
        })?;
        match answer.await {
            Ok(Ok(id)) => Ok(id),
            Ok(Err(reason)) => Err(ServerError::Refused(reason)),
            Err(_) => Err(ServerError::HubClosed),
        }
    }

    /// Forward input.
    pub fn input(&self, id: SessionId, bytes: Vec<u8>) -> Result<()> {
        self.send(HubEvent::Input { id, bytes })
    }

    /// Forward a resize.
    pub fn resize(&self, id: SessionId, width: u16, height: u16) -> Result<()> {
        self.send(HubEvent::Resize { id, width, height })
    }

    /// Report a closed stream. Safe to call more than once.
    pub fn disconnect(&self, id: SessionId) {
        let _ = self.send(HubEvent::Disconnect { id });
    }

    fn send(&self, event: HubEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| ServerError::HubClosed)
    }
}

/// Loop timing and session defaults.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Period between simulation ticks.
    pub tick_period: Duration,
    /// Period between frames.
    pub frame_period: Duration,
    /// Save every session this often.
    pub autosave: Option<Duration>,
    /// Stop once the last session has ended (local play).
    pub exit_when_idle: bool,
    /// Handed to every new session.
    pub session: SessionConfig,
}

impl HubConfig {
    /// Multi-player settings.
    #[must_use]
    pub fn server(config: &ServerConfig) -> Self {
        Self {
            tick_period: config.tick_period(),
            frame_period: config.frame_period(),
            autosave: config.autosave_interval(),
            exit_when_idle: false,
            session: SessionConfig {
                public_address: config.public_address.clone(),
                debug: false,
                seed: clock_seed(),
            },
        }
    }

    /// Single local player: no autosave, exit with the session.
    #[must_use]
    pub fn local(config: &ServerConfig, debug: bool) -> Self {
        Self {
            autosave: None,
            exit_when_idle: true,
            session: SessionConfig {
                public_address: config.public_address.clone(),
                debug,
                seed: clock_seed(),
            },
            ..Self::server(config)
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Owner of the registry and scheduler.
pub struct Hub {
    config: HubConfig,
    store: Arc<dyn PersistenceAdapter>,
    registry: Registry,
    scheduler: Scheduler,
    served: usize,
}

impl Hub {
    /// Hub persisting through `store`.
    pub fn new(config: HubConfig, store: Arc<dyn PersistenceAdapter>) -> Self {
        let scheduler = Scheduler::new(config.autosave, Instant::now());
        Self {
            config,
            store,
            registry: Registry::new(),
            scheduler,
            served: 0,
        }
    }

    /// Channel for transports.
    #[must_use]
    pub fn channel() -> (HubHandle, mpsc::UnboundedReceiver<HubEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (HubHandle { tx }, rx)
    }

    /// Live sessions.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Loop membership.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Start a session for `identity`, evicting any live session it already
    /// has. The eviction completes, lock release included, before the new
    /// session asks for the lock.
    ///
    /// A refused session still receives a notice on its sink before the
    /// sink is closed.
    pub fn connect(&mut self, identity: Identity, sink: Box<dyn Sink>, size: (u16, u16)) -> Result<SessionId> {
        if !identity.is_anonymous() {
            if let Some(old) = self.registry.live_for(&identity) {
                info!(session = %old, identity = %identity, "Same identity connected again, evicting");
                self.end(old, Farewell::Evicted);
            }
        }

        let id = self.registry.allocate_id();
        let mut session = Session::new(id, identity, self.store.clone(), sink, size, self.config.session.clone());
        if let Err(e) = session.init() {
            let farewell = match e {
                SessionError::SaveLocked(_) => Farewell::SaveInUse,
                _ => Farewell::StartupFailed,
            };
            warn!(session = %id, identity = %session.identity(), error = %e, "Session refused");
            session.destroy(farewell);
            return Err(e.into());
        }

        let id = match self.registry.insert(session) {
            Ok(id) => id,
            Err(mut session) => {
                warn!(session = %id, "Identity already live, refusing");
                session.destroy(Farewell::SaveInUse);
                return Err(SessionError::SaveLocked(session.identity().redacted()).into());
            }
        };
        self.scheduler.register(id);
        self.served += 1;
        info!(session = %id, live = self.registry.len(), "Session connected");

        // First frame right away rather than on the next frame firing.
        if let Some(session) = self.registry.get_mut(id) {
            if let Err(e) = session.render() {
                debug!(session = %id, error = %e, "Initial render failed");
            }
        }
        Ok(id)
    }

    /// Feed input to a session.
    pub fn input(&mut self, id: SessionId, bytes: &[u8]) {
        let Some(session) = self.registry.get_mut(id) else {
            return;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| session.feed_input(bytes))) {
            Ok(InputOutcome::Continue) => {}
            Ok(InputOutcome::Closed(farewell)) => self.end(id, farewell),
            Err(_) => {
                warn!(session = %id, "Session panicked handling input");
                self.end(id, Farewell::Disconnected);
            }
        }
    }

    /// Resize a session.
    pub fn resize(&mut self, id: SessionId, width: u16, height: u16) {
        if let Some(session) = self.registry.get_mut(id) {
            session.resize(width, height);
        }
    }

    /// The client went away.
    pub fn disconnect(&mut self, id: SessionId) {
        if self.registry.contains(id) {
            self.end(id, Farewell::Disconnected);
        }
    }

    /// Unregister, remove and destroy. Ids already gone are ignored.
    fn end(&mut self, id: SessionId, farewell: Farewell) {
        self.scheduler.unregister(id);
        let Some(mut session) = self.registry.remove(id) else {
            return;
        };
        if panic::catch_unwind(AssertUnwindSafe(|| session.destroy(farewell))).is_err() {
            warn!(session = %id, "Session panicked during teardown");
        }
        info!(session = %id, reason = farewell.label(), live = self.registry.len(), "Session removed");
    }

    fn reap(&mut self, firing: &Firing) {
        for id in &firing.panicked {
            self.end(*id, Farewell::Disconnected);
        }
    }

    /// One simulation tick for every session, then an autosave if due.
    pub fn tick(&mut self) {
        let firing = self.scheduler.fire_ticks(self.registry.sessions_mut());
        self.reap(&firing);
        self.autosave_if_due(Instant::now());
    }

    /// Save every session if the autosave interval has passed.
    pub fn autosave_if_due(&mut self, now: Instant) {
        if let Some(firing) = self.scheduler.autosave_if_due(self.registry.sessions_mut(), now) {
            self.reap(&firing);
        }
    }

    /// One frame for every session.
    pub fn frame(&mut self) {
        let firing = self.scheduler.fire_frames(self.registry.sessions_mut());
        self.reap(&firing);
    }

    /// Apply one event.
    pub fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connect {
                identity,
                sink,
                size,
                reply,
            } => {
                let result = self.connect(identity, sink, size).map_err(|e| e.to_string());
                if reply.send(result).is_err() {
                    debug!("Connection gave up before the session started");
                }
            }
            HubEvent::Input { id, bytes } => self.input(id, &bytes),
            HubEvent::Resize { id, width, height } => self.resize(id, width, height),
            HubEvent::Disconnect { id } => self.disconnect(id),
        }
    }

    /// Destroy every session with the shutdown notice.
    pub fn shutdown(&mut self) {
        let ids = self.registry.ids();
        info!(sessions = ids.len(), "Closing all sessions");
        for id in ids {
            self.end(id, Farewell::Shutdown);
        }
    }

    /// True once a local hub has nothing left to run.
    fn finished(&self) -> bool {
        self.config.exit_when_idle && self.served > 0 && self.registry.is_empty()
    }

    /// Run until `shutdown` resolves, every handle is dropped, or (local
    /// play) the last session ends. Remaining sessions are then shut down.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<HubEvent>, shutdown: impl Future<Output = ()>) {
        let mut ticks = time::interval(self.config.tick_period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = time::interval(self.config.frame_period);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            tick_ms = self.config.tick_period.as_millis() as u64,
            frame_ms = self.config.frame_period.as_millis() as u64,
            "Hub running"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
                _ = ticks.tick() => self.tick(),
                _ = frames.tick() => self.frame(),
            }
            if self.finished() {
                break;
            }
        }

        self.shutdown();
    }
}
