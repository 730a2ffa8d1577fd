//! # Clicker Server
//!
//! Runs byte clicker sessions for many players at once, or for one player
//! in the local terminal.
//!
//! A single [`hub::Hub`] task owns every session. Transports
//! ([`ssh`] and [`local`]) turn connections into [`hub::HubEvent`]s; the hub
//! applies them between fixed-rate tick and frame firings driven by the
//! [`scheduler::Scheduler`]. Progress is kept by the file-backed adapters in
//! [`store`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod hub;
pub mod local;
pub mod logging;
pub mod registry;
pub mod scheduler;
pub mod ssh;
pub mod store;

pub use config::{Cli, ServerConfig};
pub use error::{Result, ServerError};
