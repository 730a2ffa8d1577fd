//! Session error types.

use thiserror::Error;

use clicker_core::error::GameError;

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised while running a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The identity's save is held by another session or process.
    #[error("Save is already in use: {0}")]
    SaveLocked(String),

    /// Persistence or simulation failure.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Writing to the client failed.
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation on a session that was already torn down.
    #[error("Session {0} is closed")]
    Closed(String),
}
