//! One connected player.
//!
//! A [`Session`] binds an [`Identity`] to a [`Surface`], an [`InputChannel`]
//! and the [`Game`] state loaded through a [`PersistenceAdapter`]. The
//! transport feeds it bytes and resize events; the scheduler calls
//! [`Session::tick`] and [`Session::render`]. Every exit path ends in
//! [`Session::destroy`], which runs once.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use clicker_core::identity::Identity;
use clicker_core::persistence::PersistenceAdapter;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::controls::{Game, Request};
use crate::error::{Result, SessionError};
use crate::input::{Dispatch, InputChannel, Key};
use crate::notice;
use crate::state::UiState;
use crate::terminal::{Sink, Surface};
use crate::ui::{self, FrameInfo};

/// Identifier assigned by whoever accepts the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a session ended. Decides the parting notice and whether progress is
/// saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Farewell {
    /// The stream closed underneath us.
    Disconnected,
    /// The player pressed Ctrl+C.
    Interrupted,
    /// The same identity connected again elsewhere.
    Evicted,
    /// The server is stopping.
    Shutdown,
    /// The player deleted their data.
    AccountDeleted,
    /// The save was locked when the session tried to start.
    SaveInUse,
    /// The session could not start for another reason.
    StartupFailed,
}

impl Farewell {
    /// Notice written to the stream after the terminal is restored.
    #[must_use]
    pub fn notice(self) -> Option<String> {
        match self {
            Self::Disconnected => None,
            Self::Interrupted => Some(notice::info("Thanks for playing! Your progress has been saved.")),
            Self::Evicted => Some(notice::info(
                "You logged in from another location, so this session was closed. Your progress has been saved.",
            )),
            Self::Shutdown => Some(notice::info(
                "The server is shutting down. Your progress has been saved.",
            )),
            Self::AccountDeleted => Some(notice::success("All your data has been deleted.")),
            Self::SaveInUse => Some(notice::error(
                "Your save is currently in use by another session. Close any other sessions using this key and try again.",
            )),
            Self::StartupFailed => Some(notice::error("Failed to start your game session. Please try again later.")),
        }
    }

    /// Whether progress is written back on the way out. Sessions that never
    /// started have nothing to write either way.
    #[must_use]
    pub fn saves(self) -> bool {
        !matches!(self, Self::AccountDeleted | Self::SaveInUse | Self::StartupFailed)
    }

    /// Short name for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Interrupted => "interrupted",
            Self::Evicted => "evicted",
            Self::Shutdown => "shutdown",
            Self::AccountDeleted => "account deleted",
            Self::SaveInUse => "save in use",
            Self::StartupFailed => "startup failed",
        }
    }
}

/// Per-session settings supplied by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Address shown in the footer.
    pub public_address: String,
    /// Debug overlay and time-skip keys.
    pub debug: bool,
    /// Seed for the effect PRNG. Mixed with the session id.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            public_address: "localhost".to_string(),
            debug: false,
            seed: 0,
        }
    }
}

/// What happened to the session after a chunk of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Still running.
    Continue,
    /// Torn down; the transport should close the stream.
    Closed(Farewell),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Active,
    Destroyed(Farewell),
}

/// Frames per second over the last full second.
#[derive(Debug, Default)]
struct FrameCounter {
    window_start_ms: u64,
    frames: u32,
    fps: u32,
}

impl FrameCounter {
    fn record(&mut self, now_ms: u64) -> u32 {
        self.frames += 1;
        let elapsed = now_ms.saturating_sub(self.window_start_ms);
        if elapsed >= 1000 {
            self.fps = (u64::from(self.frames) * 1000 / elapsed) as u32;
            self.frames = 0;
            self.window_start_ms = now_ms;
        }
        self.fps
    }
}

/// Identity, terminal and game state of one connection.
pub struct Session {
    id: SessionId,
    identity: Identity,
    store: Arc<dyn PersistenceAdapter>,
    surface: Surface,
    input: InputChannel,
    game: Option<Game>,
    config: SessionConfig,
    lifecycle: Lifecycle,
    holds_lock: bool,
    started: Instant,
    frames: FrameCounter,
}

impl Session {
    /// New session drawing to `sink`. Nothing is loaded until [`Session::init`].
    pub fn new(
        id: SessionId,
        identity: Identity,
        store: Arc<dyn PersistenceAdapter>,
        sink: Box<dyn Sink>,
        (width, height): (u16, u16),
        config: SessionConfig,
    ) -> Self {
        Self {
            id,
            identity,
            store,
            surface: Surface::new(sink, width, height),
            input: InputChannel::new(),
            game: None,
            config,
            lifecycle: Lifecycle::Created,
            holds_lock: false,
            started: Instant::now(),
            frames: FrameCounter::default(),
        }
    }

    /// Take the save lock, load progress and prepare the terminal.
    ///
    /// Fails with [`SessionError::SaveLocked`] when another session or
    /// process holds the identity's save; nothing is loaded in that case.
    ///
    /// # Errors
    ///
    /// Lock refusal, storage failure, or a dead stream.
    pub fn init(&mut self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Created => {}
            Lifecycle::Active => return Ok(()),
            Lifecycle::Destroyed(_) => return Err(SessionError::Closed(self.id.to_string())),
        }

        if !self.store.acquire_lock(&self.identity)? {
            warn!(session = %self.id, identity = %self.identity.redacted(), "Save is locked elsewhere");
            return Err(SessionError::SaveLocked(self.identity.redacted()));
        }
        self.holds_lock = true;

        let (sim, settings) = match self.store.load_or_initialize(&self.identity) {
            Ok(loaded) => loaded,
            Err(e) => {
                self.release_lock();
                return Err(e.into());
            }
        };

        let (width, height) = self.surface.size();
        let debug = self.config.debug || cfg!(feature = "dev-tools");
        let seed = self.config.seed.wrapping_add(self.id.0);
        let ui = UiState::new(width, settings, !self.identity.is_anonymous(), debug, seed);
        self.surface.set_black_background(settings.pure_black_background);
        self.game = Some(Game::new(sim, ui, width, height));

        if let Err(e) = self.surface.setup() {
            self.game = None;
            self.release_lock();
            return Err(e.into());
        }

        self.lifecycle = Lifecycle::Active;
        info!(
            session = %self.id,
            identity = %self.identity.redacted(),
            width,
            height,
            "Session started"
        );
        Ok(())
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Who the session belongs to.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// True between a successful [`Session::init`] and [`Session::destroy`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Why the session ended, once it has.
    #[must_use]
    pub fn farewell(&self) -> Option<Farewell> {
        match self.lifecycle {
            Lifecycle::Destroyed(farewell) => Some(farewell),
            _ => None,
        }
    }

    /// Game state, present once initialized.
    #[must_use]
    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    /// Mutable game state.
    pub fn game_mut(&mut self) -> Option<&mut Game> {
        self.game.as_mut()
    }

    /// Terminal surface.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Register an extra key observer. It runs after the game has handled
    /// the key.
    pub fn on_key(&mut self, handler: impl FnMut(Key) + Send + 'static) {
        self.input.on_key(handler);
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Advance the simulation one tick.
    pub fn tick(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Some(game) = self.game.as_mut() {
            game.tick();
        }
    }

    /// Redraw the frame and send what changed. Returns bytes written.
    ///
    /// # Errors
    ///
    /// Writing to the stream failed.
    pub fn render(&mut self) -> Result<usize> {
        if !self.is_active() {
            return Ok(0);
        }
        let now = self.now_ms();
        let fps = self.frames.record(now);
        let Some(game) = self.game.as_mut() else {
            return Ok(0);
        };

        self.surface.set_black_background(game.ui.settings.pure_black_background);
        self.surface.clear(false)?;
        let info = FrameInfo {
            public_address: &self.config.public_address,
            fps,
        };
        ui::draw_frame(&mut self.surface, game, &info);
        Ok(self.surface.render()?)
    }

    /// Handle a chunk of input bytes from the stream.
    pub fn feed_input(&mut self, bytes: &[u8]) -> InputOutcome {
        let now = self.now_ms();
        self.feed_input_at(bytes, now)
    }

    /// [`Session::feed_input`] with an explicit clock, in milliseconds since
    /// the session started.
    pub fn feed_input_at(&mut self, bytes: &[u8], now_ms: u64) -> InputOutcome {
        match self.lifecycle {
            Lifecycle::Created => return InputOutcome::Continue,
            Lifecycle::Destroyed(farewell) => return InputOutcome::Closed(farewell),
            Lifecycle::Active => {}
        }
        let Some(game) = self.game.as_mut() else {
            return InputOutcome::Continue;
        };

        game.now_ms = now_ms;
        let dispatch = self.input.feed(bytes, game);
        let requests = game.drain_requests();

        if dispatch == Dispatch::Interrupted {
            self.destroy(Farewell::Interrupted);
            return InputOutcome::Closed(Farewell::Interrupted);
        }

        for request in requests {
            match request {
                Request::DeleteAccount => {
                    if self.delete_account() {
                        return InputOutcome::Closed(Farewell::AccountDeleted);
                    }
                }
            }
        }

        if let Err(e) = self.render() {
            debug!(session = %self.id, error = %e, "Render after input failed");
        }
        InputOutcome::Continue
    }

    fn delete_account(&mut self) -> bool {
        if self.identity.is_anonymous() {
            return false;
        }
        match self.store.delete(&self.identity) {
            Ok(()) => {
                info!(session = %self.id, identity = %self.identity.redacted(), "Account deleted");
                self.destroy(Farewell::AccountDeleted);
                true
            }
            Err(e) => {
                error!(session = %self.id, error = %e, "Account deletion failed");
                if let Some(game) = self.game.as_mut() {
                    game.ui.settings_cursor.deleting_account = false;
                }
                false
            }
        }
    }

    /// New terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        if matches!(self.lifecycle, Lifecycle::Destroyed(_)) {
            return;
        }
        debug!(session = %self.id, width, height, "Resize");
        self.surface.resize(width, height);
        let (width, height) = self.surface.size();
        if let Some(game) = self.game.as_mut() {
            game.resize(width, height);
        }
    }

    /// Persist progress and settings.
    ///
    /// # Errors
    ///
    /// Storage failure.
    pub fn save(&self) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }
        if let Some(game) = &self.game {
            self.store.save(&self.identity, &game.sim, game.ui.settings)?;
        }
        Ok(())
    }

    fn release_lock(&mut self) {
        if !self.holds_lock {
            return;
        }
        if let Err(e) = self.store.release_lock(&self.identity) {
            warn!(session = %self.id, error = %e, "Failed to release save lock");
        }
        self.holds_lock = false;
    }

    /// Save, release the lock, restore the terminal, write the parting
    /// notice and close the stream.
    ///
    /// Only the first call does anything; it returns `true`.
    pub fn destroy(&mut self, farewell: Farewell) -> bool {
        if matches!(self.lifecycle, Lifecycle::Destroyed(_)) {
            return false;
        }

        if farewell.saves() {
            if let Err(e) = self.save() {
                error!(session = %self.id, error = %e, "Final save failed");
            }
        }
        self.lifecycle = Lifecycle::Destroyed(farewell);
        self.release_lock();

        if let Err(e) = self.surface.destroy() {
            debug!(session = %self.id, error = %e, "Terminal restore failed");
        }
        if let Some(text) = farewell.notice() {
            if let Err(e) = self.surface.write_raw(text.as_bytes()) {
                debug!(session = %self.id, error = %e, "Parting notice not delivered");
            }
        }
        self.surface.close();

        info!(
            session = %self.id,
            identity = %self.identity.redacted(),
            reason = farewell.label(),
            "Session ended"
        );
        true
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("identity", &self.identity.redacted())
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}
