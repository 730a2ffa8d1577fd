//! Worker tiers.

use serde::{Deserialize, Serialize};

use super::CostCurve;
use crate::math::{Bytes, Magnitude};

/// Identifier of a worker tier, in unlock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerId {
    /// Tier 1.
    Intern,
    /// Tier 2.
    JuniorDev,
    /// Tier 3.
    SeniorDev,
    /// Tier 4.
    TechLead,
    /// Tier 5.
    EngineeringManager,
    /// Tier 6.
    Director,
    /// Tier 7.
    VpEngineering,
    /// Tier 8.
    Cto,
    /// Tier 9.
    Ceo,
    /// Tier 10.
    BoardMember,
    /// Tier 11.
    Chairman,
    /// Tier 12.
    ConglomerateOwner,
}

impl WorkerId {
    /// Number of tiers.
    pub const COUNT: usize = 12;

    /// All tiers in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Intern,
        Self::JuniorDev,
        Self::SeniorDev,
        Self::TechLead,
        Self::EngineeringManager,
        Self::Director,
        Self::VpEngineering,
        Self::Cto,
        Self::Ceo,
        Self::BoardMember,
        Self::Chairman,
        Self::ConglomerateOwner,
    ];

    /// Position in [`WORKERS`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable key used in save documents.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Intern => "intern",
            Self::JuniorDev => "junior_dev",
            Self::SeniorDev => "senior_dev",
            Self::TechLead => "tech_lead",
            Self::EngineeringManager => "engineering_manager",
            Self::Director => "director",
            Self::VpEngineering => "vp_engineering",
            Self::Cto => "cto",
            Self::Ceo => "ceo",
            Self::BoardMember => "board_member",
            Self::Chairman => "chairman",
            Self::ConglomerateOwner => "conglomerate_owner",
        }
    }

    /// Parse a save-document key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    /// Static data for this tier.
    #[must_use]
    pub fn data(self) -> &'static WorkerData {
        &WORKERS[self.index()]
    }
}

/// Static definition of a worker tier.
#[derive(Debug, Clone, Copy)]
pub struct WorkerData {
    /// Identifier.
    pub id: WorkerId,
    /// Display name.
    pub name: &'static str,
    /// Price curve.
    pub cost: CostCurve,
    /// Bytes per second produced by one worker.
    pub base_rate: Magnitude,
}

impl WorkerData {
    /// Price of the next worker when `owned` are already held.
    #[must_use]
    pub fn cost_for(&self, owned: u32) -> Bytes {
        self.cost.cost(owned)
    }
}

const fn tier(id: WorkerId, name: &'static str, cost: Magnitude, base_rate: Magnitude) -> WorkerData {
    WorkerData {
        id,
        name,
        cost: CostCurve::Geometric {
            base: cost,
            percent: 115,
        },
        base_rate,
    }
}

/// Worker table, indexed by [`WorkerId::index`].
pub static WORKERS: [WorkerData; WorkerId::COUNT] = [
    tier(WorkerId::Intern, "Intern", Magnitude::bytes(10), Magnitude::bytes(1)),
    tier(WorkerId::JuniorDev, "Junior Developer", Magnitude::new(1, 1), Magnitude::bytes(16)),
    tier(WorkerId::SeniorDev, "Senior Developer", Magnitude::new(32, 1), Magnitude::bytes(256)),
    tier(WorkerId::TechLead, "Tech Lead", Magnitude::new(1, 2), Magnitude::new(4, 1)),
    tier(
        WorkerId::EngineeringManager,
        "Engineering Manager",
        Magnitude::new(32, 2),
        Magnitude::new(64, 1),
    ),
    tier(WorkerId::Director, "Director of Engineering", Magnitude::new(1, 3), Magnitude::new(1, 2)),
    tier(WorkerId::VpEngineering, "VP of Engineering", Magnitude::new(32, 3), Magnitude::new(16, 2)),
    tier(WorkerId::Cto, "Chief Technology Officer", Magnitude::new(1, 4), Magnitude::new(256, 2)),
    tier(WorkerId::Ceo, "Chief Executive Officer", Magnitude::new(32, 4), Magnitude::new(4, 3)),
    tier(WorkerId::BoardMember, "Board Member", Magnitude::new(1, 5), Magnitude::new(64, 3)),
    tier(WorkerId::Chairman, "Chairman", Magnitude::new(32, 5), Magnitude::new(1, 4)),
    tier(
        WorkerId::ConglomerateOwner,
        "Conglomerate Owner",
        Magnitude::new(1, 6),
        Magnitude::new(16, 4),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for id in WorkerId::ALL {
            assert_eq!(WorkerId::from_key(id.key()), Some(id));
        }
        assert_eq!(WorkerId::from_key("angel_investor"), None);
    }

    #[test]
    fn test_first_intern_costs_ten() {
        assert_eq!(WorkerId::Intern.data().cost_for(0), Bytes::from(10u32));
        assert_eq!(WorkerId::Intern.data().cost_for(1), Bytes::from(12u32));
    }

    #[test]
    fn test_tiers_get_more_expensive() {
        for pair in WORKERS.windows(2) {
            assert!(pair[0].cost_for(0) < pair[1].cost_for(0));
            assert!(pair[0].base_rate.to_bytes() < pair[1].base_rate.to_bytes());
        }
    }
}
