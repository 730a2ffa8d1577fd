//! # Clicker Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture states and identities
//! - Fractional accumulation harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod accumulation;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
