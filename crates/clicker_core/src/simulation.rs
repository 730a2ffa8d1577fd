//! Per-player simulation state.
//!
//! One [`SimulationState`] belongs to exactly one session. It is advanced by
//! [`SimulationState::tick`] at [`TICK_RATE`] and mutated by purchases and
//! clicks in between.
//!
//! # Determinism
//!
//! - No floating point: progress, rate and costs are [`Bytes`]
//! - No wall clock: clicks take the caller's timestamp
//! - Fractional production is carried between ticks, never dropped
//!
//! # Example
//!
//! ```
//! use clicker_core::data::WorkerId;
//! use clicker_core::math::Bytes;
//! use clicker_core::simulation::SimulationState;
//!
//! let mut sim = SimulationState::new();
//! sim.set_bytes(Bytes::from(10u32));
//! sim.buy_worker(WorkerId::Intern).unwrap();
//!
//! // One intern makes one byte per second.
//! for _ in 0..20 {
//!     sim.tick();
//! }
//! assert_eq!(sim.bytes(), &Bytes::from(1u32));
//! ```

use num_traits::{ToPrimitive, Zero};
use tracing::{debug, warn};

use crate::data::{UpgradeId, WorkerId};
use crate::economy::{self, UpgradeCounts, WorkerCounts};
use crate::error::{GameError, Result};
use crate::math::Bytes;

/// Ticks per second for the simulation.
pub const TICK_RATE: u32 = 20;

/// Duration of one tick in milliseconds.
pub const TICK_DURATION_MS: u32 = 1000 / TICK_RATE;

/// Progress, holdings and the cached production rate of one player.
///
/// Owned counts are private so that every change goes through a method that
/// recomputes the cached rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationState {
    bytes: Bytes,
    workers: WorkerCounts,
    upgrades: UpgradeCounts,
    prestige: u32,
    rate: Bytes,
    /// Sub-tick remainder, always `< TICK_RATE`.
    carry: u32,
    ticks_played: u64,
    ticks_this_prestige: u64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationState {
    /// Fresh state: no bytes, no workers, no upgrades.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Bytes::zero(),
            workers: [0; WorkerId::COUNT],
            upgrades: [0; UpgradeId::COUNT],
            prestige: 0,
            rate: Bytes::zero(),
            carry: 0,
            ticks_played: 0,
            ticks_this_prestige: 0,
        }
    }

    /// Rebuild a state from persisted parts.
    ///
    /// The rate is recomputed rather than trusted, an out-of-range carry
    /// is reduced modulo [`TICK_RATE`], and worker counts and the prestige
    /// level are capped at [`economy::MAX_WORKERS_OWNED`] and
    /// [`economy::MAX_PRESTIGE`].
    #[must_use]
    pub fn restore(
        bytes: Bytes,
        workers: WorkerCounts,
        upgrades: UpgradeCounts,
        prestige: u32,
        carry: u32,
        ticks_played: u64,
        ticks_this_prestige: u64,
    ) -> Self {
        let mut workers = workers;
        for (index, owned) in workers.iter_mut().enumerate() {
            if *owned > economy::MAX_WORKERS_OWNED {
                warn!(tier = index, owned = *owned, "Worker count out of range, capping");
                *owned = economy::MAX_WORKERS_OWNED;
            }
        }
        if prestige > economy::MAX_PRESTIGE {
            warn!(level = prestige, "Prestige level out of range, capping");
        }
        let prestige = prestige.min(economy::MAX_PRESTIGE);

        let mut state = Self {
            bytes,
            workers,
            upgrades,
            prestige,
            rate: Bytes::zero(),
            carry: carry % TICK_RATE,
            ticks_played,
            ticks_this_prestige,
        };
        state.recompute_rate();
        state
    }

    /// Current byte balance.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Overwrite the balance.
    pub fn set_bytes(&mut self, bytes: Bytes) {
        self.bytes = bytes;
    }

    /// Cached production rate in bytes per second.
    #[must_use]
    pub fn rate(&self) -> &Bytes {
        &self.rate
    }

    /// Prestige level.
    #[must_use]
    pub fn prestige(&self) -> u32 {
        self.prestige
    }

    /// Production and click multiplier from prestige.
    #[must_use]
    pub fn multiplier(&self) -> Bytes {
        economy::prestige_multiplier(self.prestige)
    }

    /// Sub-tick remainder carried to the next tick.
    #[must_use]
    pub fn carry(&self) -> u32 {
        self.carry
    }

    /// Total ticks simulated for this player.
    #[must_use]
    pub fn ticks_played(&self) -> u64 {
        self.ticks_played
    }

    /// Ticks simulated since the last prestige.
    #[must_use]
    pub fn ticks_this_prestige(&self) -> u64 {
        self.ticks_this_prestige
    }

    /// Owned count of a worker tier.
    #[must_use]
    pub fn worker_count(&self, id: WorkerId) -> u32 {
        self.workers[id.index()]
    }

    /// Owned count of an upgrade.
    #[must_use]
    pub fn upgrade_count(&self, id: UpgradeId) -> u32 {
        self.upgrades[id.index()]
    }

    /// All worker counts.
    #[must_use]
    pub fn workers(&self) -> &WorkerCounts {
        &self.workers
    }

    /// All upgrade counts.
    #[must_use]
    pub fn upgrades(&self) -> &UpgradeCounts {
        &self.upgrades
    }

    /// Price of the next worker of a tier.
    #[must_use]
    pub fn worker_cost(&self, id: WorkerId) -> Bytes {
        id.data().cost_for(self.worker_count(id))
    }

    /// Price of the next level of an upgrade.
    #[must_use]
    pub fn upgrade_cost(&self, id: UpgradeId) -> Bytes {
        id.data().cost_for(self.upgrade_count(id))
    }

    /// True when the balance covers `cost`.
    #[must_use]
    pub fn can_afford(&self, cost: &Bytes) -> bool {
        &self.bytes >= cost
    }

    /// Whether an upgrade is offered yet.
    #[must_use]
    pub fn is_upgrade_unlocked(&self, id: UpgradeId) -> bool {
        id.data()
            .prerequisite()
            .map_or(true, |worker| self.worker_count(worker) > 0)
    }

    /// Advance one tick and return the bytes gained.
    ///
    /// `rate + carry` is split into whole bytes for this tick and a
    /// remainder for the next, so over `N` ticks at a constant rate the
    /// total is exactly `floor(rate × N / TICK_RATE)`.
    pub fn tick(&mut self) -> Bytes {
        let numer = &self.rate + self.carry;
        let gain = &numer / TICK_RATE;
        self.carry = (numer % TICK_RATE).to_u32().unwrap_or(0);
        self.bytes += &gain;
        self.ticks_played += 1;
        self.ticks_this_prestige += 1;

        #[cfg(feature = "debug-validation")]
        self.validate();

        gain
    }

    /// Buy one worker of a tier, returning the price paid.
    ///
    /// On failure the balance and counts are unchanged.
    pub fn buy_worker(&mut self, id: WorkerId) -> Result<Bytes> {
        if self.worker_count(id) >= economy::MAX_WORKERS_OWNED {
            return Err(GameError::WorkerMaxed {
                id: id.key(),
                max: economy::MAX_WORKERS_OWNED,
            });
        }
        let cost = self.worker_cost(id);
        self.spend(&cost)?;
        self.workers[id.index()] += 1;
        self.recompute_rate();
        debug!(worker = id.key(), owned = self.workers[id.index()], "Bought worker");
        Ok(cost)
    }

    /// Buy one level of an upgrade, returning the price paid.
    ///
    /// Fails with [`GameError::UpgradeMaxed`] before checking the price.
    pub fn buy_upgrade(&mut self, id: UpgradeId) -> Result<Bytes> {
        let data = id.data();
        let owned = self.upgrade_count(id);
        if data.is_maxed(owned) {
            return Err(GameError::UpgradeMaxed {
                id: id.key(),
                max: data.max_owned,
            });
        }
        let cost = data.cost_for(owned);
        self.spend(&cost)?;
        self.upgrades[id.index()] += 1;
        self.recompute_rate();
        debug!(upgrade = id.key(), owned = owned + 1, "Bought upgrade");
        Ok(cost)
    }

    /// Apply a click if `limiter` accepts it at `now_ms`.
    pub fn click(&mut self, limiter: &mut ClickLimiter, now_ms: u64) -> Result<Bytes> {
        let cooldown = economy::click_cooldown_ms(&self.upgrades);
        if !limiter.try_accept(now_ms, cooldown) {
            return Err(GameError::ClickRateLimited);
        }
        let gain = economy::click_gain(&self.upgrades, self.prestige);
        self.bytes += &gain;
        Ok(gain)
    }

    /// Bytes required for the next prestige level.
    #[must_use]
    pub fn prestige_cost(&self) -> Bytes {
        economy::prestige_cost(self.prestige)
    }

    /// True once the balance reaches the prestige threshold.
    #[must_use]
    pub fn can_prestige(&self) -> bool {
        self.prestige < economy::MAX_PRESTIGE && self.bytes >= self.prestige_cost()
    }

    /// Reset progress for a permanent multiplier. Returns the new level.
    pub fn prestige_reset(&mut self) -> Result<u32> {
        if self.prestige >= economy::MAX_PRESTIGE {
            return Err(GameError::PrestigeMaxed(economy::MAX_PRESTIGE));
        }
        let required = self.prestige_cost();
        if self.bytes < required {
            return Err(GameError::PrestigeUnavailable {
                required,
                available: self.bytes.clone(),
            });
        }
        self.prestige += 1;
        self.bytes = Bytes::zero();
        self.workers = [0; WorkerId::COUNT];
        self.upgrades = [0; UpgradeId::COUNT];
        self.carry = 0;
        self.ticks_this_prestige = 0;
        self.recompute_rate();
        debug!(level = self.prestige, "Prestige reset");
        Ok(self.prestige)
    }

    /// Credit `minutes` of production at the current rate.
    pub fn skip_time(&mut self, minutes: u32) -> Bytes {
        let gained = &self.rate * (u64::from(minutes) * 60);
        self.bytes += &gained;
        gained
    }

    /// Refresh the cached rate from the owned counts.
    pub fn recompute_rate(&mut self) {
        self.rate = economy::production_rate(&self.workers, &self.upgrades, self.prestige);
    }

    fn spend(&mut self, cost: &Bytes) -> Result<()> {
        if &self.bytes < cost {
            return Err(GameError::InsufficientBytes {
                required: cost.clone(),
                available: self.bytes.clone(),
            });
        }
        self.bytes -= cost;
        Ok(())
    }

    #[cfg(feature = "debug-validation")]
    fn validate(&self) {
        debug_assert!(self.carry < TICK_RATE, "carry out of range");
        debug_assert_eq!(
            self.rate,
            economy::production_rate(&self.workers, &self.upgrades, self.prestige),
            "stale cached rate"
        );
    }
}

/// Click rate limiter.
///
/// A click inside the cooldown window is rejected and restarts the window,
/// so holding a key down never yields more than one accepted click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickLimiter {
    last_click_ms: Option<u64>,
}

impl ClickLimiter {
    /// A limiter that accepts the first click.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_click_ms: None,
        }
    }

    /// Record a click at `now_ms`; true if it is accepted.
    pub fn try_accept(&mut self, now_ms: u64, cooldown_ms: u64) -> bool {
        let accepted = self
            .last_click_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= cooldown_ms);
        self.last_click_ms = Some(now_ms);
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_bytes(n: u64) -> SimulationState {
        let mut s = SimulationState::new();
        s.set_bytes(Bytes::from(n));
        s
    }

    #[test]
    fn test_simulation_new() {
        let s = SimulationState::new();
        assert!(s.bytes().is_zero());
        assert!(s.rate().is_zero());
        assert_eq!(s.prestige(), 0);
    }

    #[test]
    fn test_buy_worker_recomputes_rate() {
        let mut s = with_bytes(10);
        let paid = s.buy_worker(WorkerId::Intern).unwrap();
        assert_eq!(paid, Bytes::from(10u32));
        assert!(s.bytes().is_zero());
        assert_eq!(s.rate(), &Bytes::from(1u32));
        assert_eq!(s.worker_cost(WorkerId::Intern), Bytes::from(12u32));
    }

    #[test]
    fn test_failed_purchase_leaves_state() {
        let mut s = with_bytes(9);
        let before = s.clone();
        assert!(matches!(
            s.buy_worker(WorkerId::Intern),
            Err(GameError::InsufficientBytes { .. })
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn test_upgrade_maxed() {
        let mut s = with_bytes(u64::MAX);
        s.buy_upgrade(UpgradeId::ErgonomicMice).unwrap();
        s.buy_upgrade(UpgradeId::ErgonomicMice).unwrap();
        let err = s.buy_upgrade(UpgradeId::ErgonomicMice).unwrap_err();
        assert!(matches!(err, GameError::UpgradeMaxed { max: 2, .. }));
    }

    #[test]
    fn test_tick_carries_fraction() {
        // 7 bytes/sec over 20 ticks is exactly 7 bytes, never 0.
        let mut s = SimulationState::restore(
            Bytes::zero(),
            {
                let mut w = [0; WorkerId::COUNT];
                w[WorkerId::Intern.index()] = 7;
                w
            },
            [0; UpgradeId::COUNT],
            0,
            0,
            0,
            0,
        );
        let mut total = Bytes::zero();
        for _ in 0..20 {
            total += s.tick();
        }
        assert_eq!(total, Bytes::from(7u32));
        assert_eq!(s.carry(), 0);
        assert_eq!(s.ticks_played(), 20);
    }

    #[test]
    fn test_click_limiter_restarts_window() {
        let mut s = SimulationState::new();
        let mut limiter = ClickLimiter::new();
        assert!(s.click(&mut limiter, 1_000).is_ok());
        assert!(s.click(&mut limiter, 1_050).is_err());
        // Window restarted at 1050, so 1120 is still too early.
        assert!(s.click(&mut limiter, 1_120).is_err());
        assert!(s.click(&mut limiter, 1_220).is_ok());
        assert_eq!(s.bytes(), &Bytes::from(2u32));
    }

    #[test]
    fn test_prestige_resets_progress() {
        let mut s = SimulationState::new();
        s.set_bytes(economy::prestige_cost(0));
        assert!(s.can_prestige());
        assert_eq!(s.prestige_reset().unwrap(), 1);
        assert!(s.bytes().is_zero());
        assert_eq!(s.multiplier(), Bytes::from(2u32));
        assert!(s.prestige_reset().is_err());
    }

    #[test]
    fn test_prestige_stops_at_limit() {
        let mut s = SimulationState::restore(
            Bytes::zero(),
            [0; WorkerId::COUNT],
            [0; UpgradeId::COUNT],
            economy::MAX_PRESTIGE,
            0,
            0,
            0,
        );
        s.set_bytes(s.prestige_cost());
        assert!(!s.can_prestige());
        assert!(matches!(s.prestige_reset(), Err(GameError::PrestigeMaxed(_))));
        assert_eq!(s.prestige(), economy::MAX_PRESTIGE);
    }

    #[test]
    fn test_skip_time() {
        let mut s = with_bytes(10);
        s.buy_worker(WorkerId::Intern).unwrap();
        assert_eq!(s.skip_time(10), Bytes::from(600u32));
    }

    #[test]
    fn test_upgrade_unlocks_with_first_worker() {
        let mut s = with_bytes(10);
        assert!(!s.is_upgrade_unlocked(UpgradeId::FreePizza));
        assert!(s.is_upgrade_unlocked(UpgradeId::MechanicalKeyboards));
        s.buy_worker(WorkerId::Intern).unwrap();
        assert!(s.is_upgrade_unlocked(UpgradeId::FreePizza));
    }
}
