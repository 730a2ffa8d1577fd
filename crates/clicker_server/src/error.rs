//! Server error types.

use std::path::PathBuf;

use clicker_game::SessionError;
use thiserror::Error;

/// Result type alias using [`ServerError`].
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        /// File that was requested.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid RON for [`crate::ServerConfig`].
    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        /// File that was parsed.
        path: PathBuf,
        /// Parser error with position.
        source: ron::error::SpannedError,
    },

    /// A config value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The SSH host key is missing or unreadable.
    #[error("Failed to load host key {path}: {reason}")]
    HostKey {
        /// Key file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The listening socket could not be opened.
    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        /// Address we tried.
        addr: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// SSH protocol failure.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// A session could not be started.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The hub declined to start a session.
    #[error("Session refused: {0}")]
    Refused(String),

    /// The hub has stopped and no longer accepts events.
    #[error("Server is shutting down")]
    HubClosed,

    /// Terminal or file I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// True when a session was refused because its save is held elsewhere.
    #[must_use]
    pub fn is_save_locked(&self) -> bool {
        matches!(self, Self::Session(SessionError::SaveLocked(_)))
    }
}
