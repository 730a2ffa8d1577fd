//! Fractional accumulation harness.
//!
//! Runs a state for `N` ticks and checks the integer total against the
//! exact continuous value `floor(rate × N / TICK_RATE)`.

use clicker_core::math::Bytes;
use clicker_core::simulation::{SimulationState, TICK_RATE};

/// Outcome of an accumulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulationResult {
    /// Ticks simulated.
    pub ticks: u64,
    /// Rate during the run.
    pub rate: Bytes,
    /// `floor(rate × ticks / TICK_RATE)`.
    pub expected: Bytes,
    /// Sum of per-tick gains.
    pub actual: Bytes,
}

impl AccumulationResult {
    /// Whether the totals match exactly.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.expected == self.actual
    }

    /// Assert the totals match, with a detailed message.
    ///
    /// # Panics
    ///
    /// Panics if the accumulated total drifted.
    pub fn assert_exact(&self) {
        assert!(
            self.is_exact(),
            "Accumulation drifted!\n\
             Rate: {}\n\
             Ticks: {}\n\
             Expected: {}\n\
             Actual: {}",
            self.rate,
            self.ticks,
            self.expected,
            self.actual
        );
    }
}

/// Tick `state` `ticks` times, starting from a zero carry.
///
/// # Panics
///
/// Panics if the state has a non-zero carry; the closed form assumes none.
#[must_use]
pub fn run_accumulation(state: &mut SimulationState, ticks: u64) -> AccumulationResult {
    assert_eq!(state.carry(), 0, "accumulation harness needs a zero carry");
    let rate = state.rate().clone();
    let start = state.bytes().clone();

    let mut gained = Bytes::default();
    for _ in 0..ticks {
        gained += state.tick();
    }
    debug_assert_eq!(state.bytes(), &(start + &gained));

    AccumulationResult {
        ticks,
        expected: &rate * ticks / TICK_RATE,
        rate,
        actual: gained,
    }
}
