//! Proptest strategies for simulation values.

use clicker_core::data::{UpgradeId, WorkerId};
use clicker_core::economy::{UpgradeCounts, WorkerCounts, MAX_WORKERS_OWNED};
use clicker_core::math::Bytes;
use clicker_core::save::{ParticleDensity, SettingsSnapshot};
use clicker_core::simulation::{SimulationState, TICK_RATE};
use proptest::prelude::*;

/// Byte counts up to 256 bits, so most values exceed `u64`.
pub fn arb_bytes() -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u32>(), 0..8).prop_map(Bytes::new)
}

/// Worker counts within the ownership limit.
pub fn arb_workers() -> impl Strategy<Value = WorkerCounts> {
    prop::array::uniform12(0u32..=MAX_WORKERS_OWNED)
}

/// Upgrade counts within each upgrade's limit.
pub fn arb_upgrades() -> impl Strategy<Value = UpgradeCounts> {
    let ranges: Vec<_> = UpgradeId::ALL
        .iter()
        .map(|id| 0..=id.data().max_owned)
        .collect();
    ranges.prop_map(|counts| {
        let mut out = [0; UpgradeId::COUNT];
        out.copy_from_slice(&counts);
        out
    })
}

/// Any reachable simulation state.
pub fn arb_state() -> impl Strategy<Value = SimulationState> {
    (
        arb_bytes(),
        arb_workers(),
        arb_upgrades(),
        0u32..64,
        0..TICK_RATE,
        any::<u64>(),
        any::<u64>(),
    )
        .prop_map(|(bytes, workers, upgrades, prestige, carry, played, this_prestige)| {
            SimulationState::restore(bytes, workers, upgrades, prestige, carry, played, this_prestige)
        })
}

/// Any settings snapshot.
pub fn arb_settings() -> impl Strategy<Value = SettingsSnapshot> {
    (any::<bool>(), prop::sample::select(ParticleDensity::ALL.to_vec())).prop_map(
        |(pure_black_background, particles)| SettingsSnapshot {
            pure_black_background,
            particles,
        },
    )
}

/// A tier id.
pub fn arb_worker_id() -> impl Strategy<Value = WorkerId> {
    prop::sample::select(WorkerId::ALL.to_vec())
}
