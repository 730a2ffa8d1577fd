//! Static game data: worker tiers, upgrades and their cost curves.
//!
//! Tables are plain `static` arrays indexed by the id enums, so lookups are
//! branch-free and nothing is allocated at startup.
//!
//! **Note:** This module contains no IO and no mutable state.

mod upgrade_data;
mod worker_data;

pub use upgrade_data::{UpgradeData, UpgradeEffect, UpgradeId, UPGRADES};
pub use worker_data::{WorkerData, WorkerId, WORKERS};

use crate::math::{kib_pow, mul_ratio_ceil, Bytes, Magnitude};

/// Price of the n-th purchase of something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostCurve {
    /// `base` stepped `owned` times by `× percent / 100`, rounding up each step.
    Geometric {
        /// Price of the first purchase.
        base: Magnitude,
        /// Growth per purchase (115 = +15%).
        percent: u32,
    },
    /// `base × (1024^factor_kib_power)^owned`.
    Exponential {
        /// Price of the first purchase.
        base: Magnitude,
        /// Each purchase multiplies the price by this power of 1024.
        factor_kib_power: u32,
    },
}

impl CostCurve {
    /// Price after `owned` purchases.
    #[must_use]
    pub fn cost(&self, owned: u32) -> Bytes {
        match *self {
            Self::Geometric { base, percent } => {
                let mut cost = base.to_bytes();
                for _ in 0..owned {
                    cost = mul_ratio_ceil(&cost, percent, 100);
                }
                cost
            }
            Self::Exponential {
                base,
                factor_kib_power,
            } => base.to_bytes() * kib_pow(factor_kib_power.saturating_mul(owned)),
        }
    }
}
