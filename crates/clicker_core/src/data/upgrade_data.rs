//! Upgrade definitions.

use serde::{Deserialize, Serialize};

use super::{CostCurve, WorkerId};
use crate::math::{Bytes, Magnitude};

/// Identifier of an upgrade, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    /// +1 byte per click per level.
    MechanicalKeyboards,
    /// Faster click rate limit.
    ErgonomicMice,
    /// Doubles interns.
    FreePizza,
    /// Doubles junior developers.
    PairProgramming,
    /// Doubles senior developers and tech leads.
    AgileMethodology,
    /// Doubles engineering managers.
    ScrumMasters,
    /// Doubles directors and VPs.
    CorporateSynergy,
    /// Doubles CTOs and CEOs.
    ExecutiveRetreats,
    /// Doubles board members and chairmen.
    GoldenParachutes,
    /// Doubles conglomerate owners.
    GlobalMonopoly,
    /// +25% to all production per level.
    CloudInfrastructure,
    /// +50% to all production per level.
    AiAutomation,
    /// Doubles all production.
    QuantumEfficiency,
}

impl UpgradeId {
    /// Number of upgrades.
    pub const COUNT: usize = 13;

    /// All upgrades in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::MechanicalKeyboards,
        Self::ErgonomicMice,
        Self::FreePizza,
        Self::PairProgramming,
        Self::AgileMethodology,
        Self::ScrumMasters,
        Self::CorporateSynergy,
        Self::ExecutiveRetreats,
        Self::GoldenParachutes,
        Self::GlobalMonopoly,
        Self::CloudInfrastructure,
        Self::AiAutomation,
        Self::QuantumEfficiency,
    ];

    /// Position in [`UPGRADES`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable key used in save documents.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MechanicalKeyboards => "mechanical_keyboards",
            Self::ErgonomicMice => "ergonomic_mice",
            Self::FreePizza => "free_pizza",
            Self::PairProgramming => "pair_programming",
            Self::AgileMethodology => "agile_methodology",
            Self::ScrumMasters => "scrum_masters",
            Self::CorporateSynergy => "corporate_synergy",
            Self::ExecutiveRetreats => "executive_retreats",
            Self::GoldenParachutes => "golden_parachutes",
            Self::GlobalMonopoly => "global_monopoly",
            Self::CloudInfrastructure => "cloud_infrastructure",
            Self::AiAutomation => "ai_automation",
            Self::QuantumEfficiency => "quantum_efficiency",
        }
    }

    /// Parse a save-document key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    /// Static data for this upgrade.
    #[must_use]
    pub fn data(self) -> &'static UpgradeData {
        &UPGRADES[self.index()]
    }
}

/// What owning an upgrade does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeEffect {
    /// Each level adds one byte to every click.
    ClickBonus,
    /// Each level raises the click rate limit by 50%.
    ClickRate,
    /// Doubles the contribution of the listed tiers.
    DoubleWorkers(&'static [WorkerId]),
    /// Multiplies total production by `(100 + percent × owned) / 100`.
    PercentBoost(u32),
    /// Multiplies total production by `2^owned`.
    DoubleAll,
}

/// Static definition of an upgrade.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeData {
    /// Identifier.
    pub id: UpgradeId,
    /// Display name.
    pub name: &'static str,
    /// One-line description shown under the name.
    pub description: &'static str,
    /// Price curve.
    pub cost: CostCurve,
    /// Purchase limit.
    pub max_owned: u32,
    /// Effect while owned.
    pub effect: UpgradeEffect,
}

impl UpgradeData {
    /// Price of the next level when `owned` are already held.
    #[must_use]
    pub fn cost_for(&self, owned: u32) -> Bytes {
        self.cost.cost(owned)
    }

    /// Worker tier that must be owned before this upgrade is offered.
    #[must_use]
    pub fn prerequisite(&self) -> Option<WorkerId> {
        match self.effect {
            UpgradeEffect::DoubleWorkers(tiers) => tiers.first().copied(),
            _ => None,
        }
    }

    /// True once `owned` reached the purchase limit.
    #[must_use]
    pub fn is_maxed(&self, owned: u32) -> bool {
        owned >= self.max_owned
    }
}

const fn geometric(coefficient: u64, kib_power: u32, percent: u32) -> CostCurve {
    CostCurve::Geometric {
        base: Magnitude::new(coefficient, kib_power),
        percent,
    }
}

const fn doubling(
    id: UpgradeId,
    name: &'static str,
    description: &'static str,
    cost: CostCurve,
    tiers: &'static [WorkerId],
) -> UpgradeData {
    UpgradeData {
        id,
        name,
        description,
        cost,
        max_owned: 1,
        effect: UpgradeEffect::DoubleWorkers(tiers),
    }
}

/// Upgrade table, indexed by [`UpgradeId::index`].
pub static UPGRADES: [UpgradeData; UpgradeId::COUNT] = [
    UpgradeData {
        id: UpgradeId::MechanicalKeyboards,
        name: "Mechanical Keyboards",
        description: "Each click produces +1 extra byte.",
        cost: geometric(512, 0, 115),
        max_owned: 10,
        effect: UpgradeEffect::ClickBonus,
    },
    UpgradeData {
        id: UpgradeId::ErgonomicMice,
        name: "Ergonomic Mice",
        description: "Clicking speed limit increased by 50%. Max: 2.",
        cost: geometric(8, 1, 150),
        max_owned: 2,
        effect: UpgradeEffect::ClickRate,
    },
    doubling(
        UpgradeId::FreePizza,
        "Free Pizza Fridays",
        "Interns produce 2× more.",
        geometric(64, 1, 115),
        &[WorkerId::Intern],
    ),
    doubling(
        UpgradeId::PairProgramming,
        "Pair Programming",
        "Junior Developers produce 2× more.",
        geometric(256, 1, 115),
        &[WorkerId::JuniorDev],
    ),
    doubling(
        UpgradeId::AgileMethodology,
        "Agile Methodology",
        "Senior Developers and Tech Leads produce 2× more.",
        geometric(4, 2, 115),
        &[WorkerId::SeniorDev, WorkerId::TechLead],
    ),
    doubling(
        UpgradeId::ScrumMasters,
        "Scrum Masters",
        "Engineering Managers produce 2× more.",
        geometric(16, 2, 115),
        &[WorkerId::EngineeringManager],
    ),
    doubling(
        UpgradeId::CorporateSynergy,
        "Corporate Synergy",
        "Directors and VPs produce 2× more.",
        geometric(256, 2, 115),
        &[WorkerId::Director, WorkerId::VpEngineering],
    ),
    doubling(
        UpgradeId::ExecutiveRetreats,
        "Executive Retreats",
        "CTOs and CEOs produce 2× more.",
        geometric(8, 3, 115),
        &[WorkerId::Cto, WorkerId::Ceo],
    ),
    doubling(
        UpgradeId::GoldenParachutes,
        "Golden Parachutes",
        "Board Members and Chairmen produce 2× more.",
        geometric(1, 5, 115),
        &[WorkerId::BoardMember, WorkerId::Chairman],
    ),
    doubling(
        UpgradeId::GlobalMonopoly,
        "Global Monopoly",
        "Conglomerate Owners produce 2× more.",
        geometric(16, 4, 115),
        &[WorkerId::ConglomerateOwner],
    ),
    UpgradeData {
        id: UpgradeId::CloudInfrastructure,
        name: "Cloud Infrastructure",
        description: "All workers produce 25% more.",
        cost: CostCurve::Exponential {
            base: Magnitude::new(1, 4),
            factor_kib_power: 1,
        },
        max_owned: 5,
        effect: UpgradeEffect::PercentBoost(25),
    },
    UpgradeData {
        id: UpgradeId::AiAutomation,
        name: "AI Automation",
        description: "All workers produce 50% more.",
        cost: CostCurve::Exponential {
            base: Magnitude::new(1, 5),
            factor_kib_power: 2,
        },
        max_owned: 3,
        effect: UpgradeEffect::PercentBoost(50),
    },
    UpgradeData {
        id: UpgradeId::QuantumEfficiency,
        name: "Quantum Efficiency",
        description: "Doubles all production.",
        cost: CostCurve::Exponential {
            base: Magnitude::new(1, 8),
            factor_kib_power: 1,
        },
        max_owned: 1,
        effect: UpgradeEffect::DoubleAll,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for id in UpgradeId::ALL {
            assert_eq!(UpgradeId::from_key(id.key()), Some(id));
        }
    }

    #[test]
    fn test_prerequisite_is_first_doubled_tier() {
        assert_eq!(
            UpgradeId::AgileMethodology.data().prerequisite(),
            Some(WorkerId::SeniorDev)
        );
        assert_eq!(UpgradeId::MechanicalKeyboards.data().prerequisite(), None);
    }

    #[test]
    fn test_mice_cost_grows_fifty_percent() {
        let mice = UpgradeId::ErgonomicMice.data();
        assert_eq!(mice.cost_for(0), Bytes::from(8192u32));
        assert_eq!(mice.cost_for(1), Bytes::from(12288u32));
        assert!(mice.is_maxed(2));
        assert!(!mice.is_maxed(1));
    }
}
