//! Persisted document format.
//!
//! A save is a JSON document with a `progress` section and a `settings`
//! section. Counters are decimal strings, owned counts are maps keyed by the
//! stable ids from [`crate::data`]. Missing fields take defaults, unknown
//! ids are dropped with a warning, so older and newer saves both load.
//!
//! ```json
//! {
//!   "version": 1,
//!   "progress": {
//!     "bytes": "123456789012345678901234567890",
//!     "rate": "16",
//!     "workers": { "intern": 3, "junior_dev": 1 },
//!     "upgrades": { "mechanical_keyboards": 2 },
//!     "prestige": 1,
//!     "carry": 7,
//!     "ticks_played": 12000,
//!     "ticks_this_prestige": 4000
//!   },
//!   "settings": { "pure_black_background": false, "particles": "reduced" }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::{UpgradeId, WorkerId};
use crate::error::Result;
use crate::math::{bytes_string, Bytes};
use crate::simulation::SimulationState;

/// Current document version.
pub const SAVE_VERSION: u32 = 1;

/// How many falling-bit particles are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleDensity {
    /// Every spawn.
    #[default]
    Full,
    /// Roughly half.
    Reduced,
    /// None.
    Disabled,
}

impl ParticleDensity {
    /// All options in cycle order.
    pub const ALL: [Self; 3] = [Self::Full, Self::Reduced, Self::Disabled];

    /// Label shown in settings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Reduced => "reduced",
            Self::Disabled => "disabled",
        }
    }

    /// Next option, wrapping.
    #[must_use]
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// Display preferences persisted with progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSnapshot {
    /// Paint the whole screen black instead of using the terminal background.
    pub pure_black_background: bool,
    /// Falling-bit particle density.
    pub particles: ParticleDensity,
}

/// Progress section of a save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRecord {
    /// Byte balance.
    #[serde(with = "bytes_string")]
    pub bytes: Bytes,
    /// Rate at save time. Informational; recomputed on load.
    #[serde(with = "bytes_string")]
    pub rate: Bytes,
    /// Owned workers by key.
    pub workers: BTreeMap<String, u32>,
    /// Owned upgrades by key.
    pub upgrades: BTreeMap<String, u32>,
    /// Prestige level.
    pub prestige: u32,
    /// Sub-tick remainder.
    pub carry: u32,
    /// Total ticks simulated.
    pub ticks_played: u64,
    /// Ticks since the last prestige.
    pub ticks_this_prestige: u64,
}

/// Whole persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveDocument {
    /// Format version.
    pub version: u32,
    /// Simulation progress.
    pub progress: ProgressRecord,
    /// Display preferences.
    pub settings: SettingsSnapshot,
}

impl Default for SaveDocument {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            progress: ProgressRecord::default(),
            settings: SettingsSnapshot::default(),
        }
    }
}

impl SaveDocument {
    /// Snapshot a simulation and its settings.
    #[must_use]
    pub fn capture(state: &SimulationState, settings: SettingsSnapshot) -> Self {
        let workers = WorkerId::ALL
            .into_iter()
            .filter(|id| state.worker_count(*id) > 0)
            .map(|id| (id.key().to_string(), state.worker_count(id)))
            .collect();
        let upgrades = UpgradeId::ALL
            .into_iter()
            .filter(|id| state.upgrade_count(*id) > 0)
            .map(|id| (id.key().to_string(), state.upgrade_count(id)))
            .collect();

        Self {
            version: SAVE_VERSION,
            progress: ProgressRecord {
                bytes: state.bytes().clone(),
                rate: state.rate().clone(),
                workers,
                upgrades,
                prestige: state.prestige(),
                carry: state.carry(),
                ticks_played: state.ticks_played(),
                ticks_this_prestige: state.ticks_this_prestige(),
            },
            settings,
        }
    }

    /// Rebuild the simulation. Unknown ids are logged and skipped; owned
    /// counts and the prestige level are clamped to their limits.
    #[must_use]
    pub fn into_parts(self) -> (SimulationState, SettingsSnapshot) {
        let progress = self.progress;

        let mut workers = [0u32; WorkerId::COUNT];
        for (key, count) in &progress.workers {
            match WorkerId::from_key(key) {
                Some(id) => workers[id.index()] = *count,
                None => warn!(worker = %key, "Dropping unknown worker from save"),
            }
        }

        let mut upgrades = [0u32; UpgradeId::COUNT];
        for (key, count) in &progress.upgrades {
            match UpgradeId::from_key(key) {
                Some(id) => upgrades[id.index()] = (*count).min(id.data().max_owned),
                None => warn!(upgrade = %key, "Dropping unknown upgrade from save"),
            }
        }

        let state = SimulationState::restore(
            progress.bytes,
            workers,
            upgrades,
            progress.prestige,
            progress.carry,
            progress.ticks_played,
            progress.ticks_this_prestige,
        );
        (state, self.settings)
    }

    /// Parse a stored document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize for storage.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a stored document, falling back to a fresh game if it is
    /// malformed. `owner` only labels the log line.
    #[must_use]
    pub fn decode_or_default(text: &str, owner: &str) -> (SimulationState, SettingsSnapshot) {
        match Self::from_json(text) {
            Ok(doc) => doc.into_parts(),
            Err(e) => {
                warn!(owner = %owner, error = %e, "Malformed save, starting fresh");
                (SimulationState::new(), SettingsSnapshot::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{MAX_PRESTIGE, MAX_WORKERS_OWNED};
    use crate::error::GameError;

    #[test]
    fn test_capture_and_restore() {
        let mut state = SimulationState::new();
        state.set_bytes(Bytes::from(10_000u32));
        state.buy_worker(WorkerId::Intern).unwrap();
        state.buy_upgrade(UpgradeId::MechanicalKeyboards).unwrap();
        state.tick();

        let settings = SettingsSnapshot {
            pure_black_background: true,
            particles: ParticleDensity::Reduced,
        };
        let json = SaveDocument::capture(&state, settings).to_json().unwrap();
        let (restored, restored_settings) = SaveDocument::from_json(&json).unwrap().into_parts();
        assert_eq!(restored, state);
        assert_eq!(restored_settings, settings);
    }

    #[test]
    fn test_missing_fields_default() {
        let (state, settings) =
            SaveDocument::from_json(r#"{"progress":{"bytes":"42"}}"#).unwrap().into_parts();
        assert_eq!(state.bytes(), &Bytes::from(42u32));
        assert_eq!(settings, SettingsSnapshot::default());
    }

    #[test]
    fn test_unknown_ids_dropped() {
        let json = r#"{"progress":{"workers":{"intern":2,"angel_investor":5},
            "upgrades":{"ergonomic_mice":9}}}"#;
        let (state, _) = SaveDocument::from_json(json).unwrap().into_parts();
        assert_eq!(state.worker_count(WorkerId::Intern), 2);
        assert_eq!(state.upgrade_count(UpgradeId::ErgonomicMice), 2);
        assert_eq!(state.rate(), &Bytes::from(2u32));
    }

    #[test]
    fn test_malformed_payload_falls_back() {
        let (state, settings) = SaveDocument::decode_or_default("{not json", "test");
        assert_eq!(state, SimulationState::new());
        assert_eq!(settings, SettingsSnapshot::default());

        let (state, _) = SaveDocument::decode_or_default(r#"{"progress":{"bytes":"x"}}"#, "test");
        assert_eq!(state, SimulationState::new());
    }

    #[test]
    fn test_absurd_counts_are_capped() {
        let json = r#"{"progress":{"workers":{"intern":4294967295},"prestige":4294967295}}"#;
        let (mut state, _) = SaveDocument::from_json(json).unwrap().into_parts();
        assert_eq!(state.worker_count(WorkerId::Intern), MAX_WORKERS_OWNED);
        assert_eq!(state.prestige(), MAX_PRESTIGE);

        // Pricing stays cheap and purchases refuse instead of overflowing.
        let started = std::time::Instant::now();
        let _ = state.worker_cost(WorkerId::Intern);
        let _ = state.prestige_cost();
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert!(!state.can_prestige());

        state.set_bytes(state.worker_cost(WorkerId::Intern));
        assert!(matches!(state.buy_worker(WorkerId::Intern), Err(GameError::WorkerMaxed { .. })));
        assert_eq!(state.worker_count(WorkerId::Intern), MAX_WORKERS_OWNED);
    }

    #[test]
    fn test_particle_density_cycles() {
        assert_eq!(ParticleDensity::Full.next(), ParticleDensity::Reduced);
        assert_eq!(ParticleDensity::Disabled.next(), ParticleDensity::Full);
    }
}
