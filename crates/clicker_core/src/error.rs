//! Error types for the game simulation.

use thiserror::Error;

use crate::math::Bytes;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation and persistence errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Unknown worker identifier.
    #[error("Unknown worker: {0}")]
    UnknownWorker(String),

    /// Unknown upgrade identifier.
    #[error("Unknown upgrade: {0}")]
    UnknownUpgrade(String),

    /// Not enough bytes for a purchase.
    #[error("Insufficient bytes: need {required}, have {available}")]
    InsufficientBytes {
        /// Amount required.
        required: Bytes,
        /// Amount available.
        available: Bytes,
    },

    /// Upgrade already owned the maximum number of times.
    #[error("Upgrade {id} is maxed out at {max}")]
    UpgradeMaxed {
        /// Upgrade key.
        id: &'static str,
        /// Maximum owned count.
        max: u32,
    },

    /// Worker tier already at the ownership limit.
    #[error("Worker {id} is maxed out at {max}")]
    WorkerMaxed {
        /// Worker key.
        id: &'static str,
        /// Maximum owned count.
        max: u32,
    },

    /// Prestige level already at its limit.
    #[error("Prestige is maxed out at level {0}")]
    PrestigeMaxed(u32),

    /// Click arrived inside the rate-limit window.
    #[error("Click rejected: rate limited")]
    ClickRateLimited,

    /// Prestige requested before the threshold was reached.
    #[error("Prestige requires {required} bytes, have {available}")]
    PrestigeUnavailable {
        /// Threshold for the next prestige level.
        required: Bytes,
        /// Amount available.
        available: Bytes,
    },

    /// Stored payload could not be parsed.
    #[error("Failed to parse save payload: {0}")]
    MalformedPayload(String),

    /// The save is locked by another session or process.
    #[error("Save for {0} is already in use")]
    SaveLocked(String),

    /// Backend I/O failure.
    #[error("Persistence failure: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for GameError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedPayload(e.to_string())
    }
}

impl From<std::io::Error> for GameError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
