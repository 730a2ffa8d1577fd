//! # Clicker Core
//!
//! Deterministic simulation core for Byte Clicker.
//!
//! This crate contains **only** deterministic logic:
//! - No terminal output
//! - No IO
//! - No wall clock (callers pass elapsed milliseconds in)
//! - No floating-point money (all progress is arbitrary-precision integers)
//!
//! This separation enables:
//! - Many concurrent sessions driven from one scheduler
//! - Exact save/load round trips at any scale
//! - Property testing of the economy
//!
//! ## Crate Structure
//!
//! - [`data`] - Worker and upgrade tables
//! - [`economy`] - Cost curves and aggregate rate computation
//! - [`simulation`] - Per-player simulation state and tick
//! - [`math`] - Big-integer helpers and serde adapters
//! - [`save`] - Persisted document format
//! - [`persistence`] - Persistence adapter interface and in-memory store
//! - [`identity`] - Player identity

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod data;
pub mod economy;
pub mod error;
pub mod format;
pub mod identity;
pub mod math;
pub mod persistence;
pub mod rng;
pub mod save;
pub mod simulation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{UpgradeId, WorkerId};
    pub use crate::error::{GameError, Result};
    pub use crate::identity::Identity;
    pub use crate::math::Bytes;
    pub use crate::persistence::{PersistenceAdapter, SettingsSnapshot};
    pub use crate::save::{ParticleDensity, SaveDocument};
    pub use crate::simulation::{SimulationState, TICK_RATE};
}
