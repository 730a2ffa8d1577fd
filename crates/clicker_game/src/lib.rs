//! # Clicker Game
//!
//! Everything one connected player sees and touches.
//!
//! This crate wires the deterministic core to a terminal: a double-buffered
//! [`terminal::Surface`] that only retransmits changed rows, an
//! [`input::InputChannel`] that turns raw bytes into keys, the screens in
//! [`ui`], and the [`session::Session`] that binds them to one identity and
//! one persistence handle.
//!
//! Nothing here knows about sockets or SSH. Output goes to a
//! [`terminal::Sink`], input arrives as byte slices.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod controls;
pub mod effects;
pub mod error;
pub mod input;
pub mod notice;
pub mod scroll;
pub mod session;
pub mod settings;
pub mod state;
pub mod terminal;
pub mod ui;

pub use error::{Result, SessionError};
pub use session::{Farewell, InputOutcome, Session, SessionConfig, SessionId};

/// Frames per second presented to each session.
pub const FRAME_RATE: u32 = 10;
