//! Production and pricing rules.
//!
//! Every formula here is integer-only over [`Bytes`]. Rounding happens at
//! the same points regardless of scale: percentage boosts floor after each
//! boost is applied, costs round up per step.

use crate::data::{UpgradeEffect, UpgradeId, WorkerId, UPGRADES, WORKERS};
use crate::math::{kib_pow, mul_percent_floor, Bytes};

/// Owned count per worker tier, indexed by [`WorkerId::index`].
pub type WorkerCounts = [u32; WorkerId::COUNT];

/// Owned count per upgrade, indexed by [`UpgradeId::index`].
pub type UpgradeCounts = [u32; UpgradeId::COUNT];

/// Prestige threshold at level zero (64 MiB).
pub const BASE_PRESTIGE_KIB_POWER: u32 = 2;
/// Coefficient of the level-zero prestige threshold.
pub const BASE_PRESTIGE_COEFFICIENT: u32 = 64;
/// Each prestige level multiplies the threshold by this.
pub const PRESTIGE_COST_GROWTH: u32 = 256;

/// Most workers of one tier a player can own. Worker prices are stepped
/// once per owned worker, so this also bounds pricing work per frame.
pub const MAX_WORKERS_OWNED: u32 = 1000;
/// Highest prestige level.
pub const MAX_PRESTIGE: u32 = 1000;

/// Base click cooldown in milliseconds.
pub const BASE_CLICK_COOLDOWN_MS: u64 = 100;

/// Bytes per second produced by `count` workers of one tier, before boosts.
#[must_use]
pub fn worker_contribution(id: WorkerId, count: u32) -> Bytes {
    id.data().base_rate.to_bytes() * count
}

/// Aggregate production in bytes per second.
///
/// Order of application:
/// 1. sum of tier contributions
/// 2. doubling upgrades add their tiers' contributions again
/// 3. percentage boosts, floored after each
/// 4. global doubling
/// 5. prestige multiplier
#[must_use]
pub fn production_rate(workers: &WorkerCounts, upgrades: &UpgradeCounts, prestige: u32) -> Bytes {
    let contributions: Vec<Bytes> = WORKERS
        .iter()
        .map(|w| worker_contribution(w.id, workers[w.id.index()]))
        .collect();

    let mut total: Bytes = contributions.iter().sum();

    for upgrade in &UPGRADES {
        if upgrades[upgrade.id.index()] == 0 {
            continue;
        }
        if let UpgradeEffect::DoubleWorkers(tiers) = upgrade.effect {
            for tier in tiers {
                total += &contributions[tier.index()];
            }
        }
    }

    for upgrade in &UPGRADES {
        let owned = upgrades[upgrade.id.index()];
        if owned == 0 {
            continue;
        }
        match upgrade.effect {
            UpgradeEffect::PercentBoost(percent) => {
                total = mul_percent_floor(&total, 100 + percent * owned);
            }
            UpgradeEffect::DoubleAll => {
                total <<= owned as usize;
            }
            _ => {}
        }
    }

    total * prestige_multiplier(prestige)
}

/// Exact `2^level` multiplier earned through prestige.
#[must_use]
pub fn prestige_multiplier(level: u32) -> Bytes {
    Bytes::from(1u32) << level as usize
}

/// Bytes required to reach the next prestige level.
#[must_use]
pub fn prestige_cost(level: u32) -> Bytes {
    Bytes::from(BASE_PRESTIGE_COEFFICIENT)
        * kib_pow(BASE_PRESTIGE_KIB_POWER)
        * Bytes::from(PRESTIGE_COST_GROWTH).pow(level)
}

/// Bytes earned by a single accepted click.
#[must_use]
pub fn click_gain(upgrades: &UpgradeCounts, prestige: u32) -> Bytes {
    let bonus = upgrades[UpgradeId::MechanicalKeyboards.index()];
    Bytes::from(1 + bonus) * prestige_multiplier(prestige)
}

/// Minimum spacing between accepted clicks.
///
/// Each click-rate level allows 50% more clicks per second.
#[must_use]
pub fn click_cooldown_ms(upgrades: &UpgradeCounts) -> u64 {
    let levels = u64::from(upgrades[UpgradeId::ErgonomicMice.index()]);
    BASE_CLICK_COOLDOWN_MS * 100 / (100 + 50 * levels)
}
