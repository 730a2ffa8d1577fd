//! Test fixtures and helpers.
//!
//! Pre-built simulation states and identities for consistent testing.

use clicker_core::data::{UpgradeId, WorkerId};
use clicker_core::identity::Identity;
use clicker_core::math::{kib_pow, Bytes};
use clicker_core::simulation::SimulationState;

/// Byte count from an integer.
#[must_use]
pub fn bytes(n: u64) -> Bytes {
    Bytes::from(n)
}

/// `coefficient × 1024^power`, for values past `u64`.
#[must_use]
pub fn huge(coefficient: u64, kib_power: u32) -> Bytes {
    Bytes::from(coefficient) * kib_pow(kib_power)
}

/// Identified player with a deterministic fingerprint.
#[must_use]
pub fn player(name: &str) -> Identity {
    Identity::key(format!("SHA256:{name}-0123456789abcdefghijklmnop"), name)
}

/// Fresh state holding `n` bytes.
#[must_use]
pub fn state_with_bytes(n: u64) -> SimulationState {
    let mut state = SimulationState::new();
    state.set_bytes(bytes(n));
    state
}

/// State with the given workers and nothing else.
#[must_use]
pub fn state_with_workers(workers: &[(WorkerId, u32)]) -> SimulationState {
    let mut counts = [0; WorkerId::COUNT];
    for (id, n) in workers {
        counts[id.index()] = *n;
    }
    SimulationState::restore(Bytes::default(), counts, [0; UpgradeId::COUNT], 0, 0, 0, 0)
}

/// State producing exactly `rate` bytes per second (interns only), for
/// rates up to the worker ownership limit.
#[must_use]
pub fn state_with_rate(rate: u32) -> SimulationState {
    state_with_workers(&[(WorkerId::Intern, rate)])
}

/// Late-game state whose counters are far beyond 64 bits.
#[must_use]
pub fn late_game_state() -> SimulationState {
    let mut workers = [0; WorkerId::COUNT];
    for (i, count) in workers.iter_mut().enumerate() {
        *count = 50 + i as u32 * 7;
    }
    let mut upgrades = [0; UpgradeId::COUNT];
    for id in UpgradeId::ALL {
        upgrades[id.index()] = id.data().max_owned;
    }
    SimulationState::restore(huge(3, 12), workers, upgrades, 9, 13, 4_000_000, 120_000)
}
