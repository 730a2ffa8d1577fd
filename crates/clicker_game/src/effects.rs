//! Falling-bit particles and highlight fades.

use clicker_core::math::{approx_f64, Bytes};
use clicker_core::rng::EffectRng;
use clicker_core::save::ParticleDensity;

/// Ticks a bit spawned by a click lives.
pub const CLICK_BIT_TICKS: u32 = 10;

/// Ticks a bit spawned by passive production lives.
pub const PASSIVE_BIT_TICKS: u32 = 20;

/// Ticks the cookie stays highlighted after a click.
pub const HIGHLIGHT_TICKS: u32 = 10;

/// Upper bound on live bits per session.
pub const MAX_BITS: usize = 512;

/// A `0` or `1` drifting down the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingBit {
    /// Column.
    pub x: i32,
    /// Row; may start above the screen.
    pub y: i32,
    /// Draw `1` instead of `0`.
    pub one: bool,
    /// Ticks until the bit disappears.
    pub ticks_left: u32,
}

impl FallingBit {
    /// Glyph drawn for the bit.
    #[must_use]
    pub const fn glyph(&self) -> &'static str {
        if self.one {
            "1"
        } else {
            "0"
        }
    }
}

/// Particle system for one session.
#[derive(Debug, Clone)]
pub struct Effects {
    bits: Vec<FallingBit>,
    rng: EffectRng,
}

impl Effects {
    /// No particles; `seed` drives spawn positions.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            bits: Vec::new(),
            rng: EffectRng::new(seed),
        }
    }

    /// Live bits.
    #[must_use]
    pub fn bits(&self) -> &[FallingBit] {
        &self.bits
    }

    /// Remove every bit.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Spawn the bit for an accepted click.
    pub fn spawn_click(&mut self, density: ParticleDensity, width: u16, height: u16) {
        let spawn = match density {
            ParticleDensity::Full => true,
            ParticleDensity::Reduced => self.rng.next_bool(),
            ParticleDensity::Disabled => false,
        };
        if spawn {
            self.spawn(width, height, CLICK_BIT_TICKS);
        }
    }

    /// Advance one tick: move and age bits, then spawn passive bits for the
    /// current production `rate`.
    pub fn tick(&mut self, rate: &Bytes, density: ParticleDensity, width: u16, height: u16) {
        if density == ParticleDensity::Disabled {
            self.bits.clear();
            return;
        }

        let bottom = i32::from(height);
        self.bits.retain_mut(|bit| {
            bit.y += 1;
            bit.ticks_left = bit.ticks_left.saturating_sub(1);
            bit.ticks_left > 0 && bit.y <= bottom
        });

        let expected = passive_spawn_rate(rate, density);
        let count = if expected > 1.0 {
            // Saturating float-to-int; the cap below bounds it anyway.
            expected as usize
        } else {
            usize::from(self.rng.next_f64() < expected)
        };
        for _ in 0..count {
            if self.bits.len() >= MAX_BITS {
                break;
            }
            self.spawn(width, height, PASSIVE_BIT_TICKS);
        }
    }

    fn spawn(&mut self, width: u16, height: u16, ticks: u32) {
        if self.bits.len() >= MAX_BITS {
            return;
        }
        let x = self.rng.next_range(1, i32::from(width) - 1);
        let y = self.rng.next_range(-15, i32::from(height) + 15);
        let one = self.rng.next_bool();
        self.bits.push(FallingBit {
            x,
            y,
            one,
            ticks_left: ticks,
        });
    }
}

/// Expected passive spawns per tick: grows with the log of the rate.
#[must_use]
pub fn passive_spawn_rate(rate: &Bytes, density: ParticleDensity) -> f64 {
    let base = approx_f64(rate).ln_1p() / 1.5f64.ln() / 25.0;
    let base = if base.is_finite() { base } else { MAX_BITS as f64 };
    match density {
        ParticleDensity::Full => base,
        ParticleDensity::Reduced => base * 0.5,
        ParticleDensity::Disabled => 0.0,
    }
}

/// Gray level of a bit with `ticks_left`: bright when fresh, dim as it ages.
#[must_use]
pub fn bit_gray(ticks_left: u32) -> u8 {
    fade(ticks_left, PASSIVE_BIT_TICKS, 50, 200)
}

/// Gray level of the cookie `highlight` ticks after a click.
#[must_use]
pub fn cookie_gray(highlight: u32) -> u8 {
    fade(highlight, HIGHLIGHT_TICKS, 120, 254)
}

fn fade(phase: u32, span: u32, low: u32, high: u32) -> u8 {
    let clamped = phase.clamp(1, span);
    let level = low + ((clamped - 1) * (high - low) + (span - 1) / 2) / (span - 1);
    level.min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_clears_bits() {
        let mut fx = Effects::new(1);
        fx.spawn_click(ParticleDensity::Full, 80, 24);
        assert_eq!(fx.bits().len(), 1);
        fx.tick(&Bytes::from(0u32), ParticleDensity::Disabled, 80, 24);
        assert!(fx.bits().is_empty());
        fx.spawn_click(ParticleDensity::Disabled, 80, 24);
        assert!(fx.bits().is_empty());
    }

    #[test]
    fn test_click_bit_expires() {
        let mut fx = Effects::new(3);
        fx.spawn_click(ParticleDensity::Full, 80, 24);
        fx.tick(&Bytes::from(0u32), ParticleDensity::Full, 80, 24);
        if let Some(bit) = fx.bits().first() {
            assert_eq!(bit.ticks_left, CLICK_BIT_TICKS - 1);
        }
        for _ in 1..CLICK_BIT_TICKS {
            fx.tick(&Bytes::from(0u32), ParticleDensity::Full, 80, 24);
        }
        assert!(fx.bits().is_empty());
    }

    #[test]
    fn test_spawn_positions_in_range() {
        let mut fx = Effects::new(9);
        for _ in 0..200 {
            fx.spawn_click(ParticleDensity::Full, 40, 10);
        }
        for bit in fx.bits() {
            assert!((1..39).contains(&bit.x));
            assert!((-15..25).contains(&bit.y));
        }
    }

    #[test]
    fn test_zero_rate_spawns_nothing() {
        assert_eq!(passive_spawn_rate(&Bytes::from(0u32), ParticleDensity::Full), 0.0);
        let mut fx = Effects::new(5);
        for _ in 0..100 {
            fx.tick(&Bytes::from(0u32), ParticleDensity::Full, 80, 24);
        }
        assert!(fx.bits().is_empty());
    }

    #[test]
    fn test_huge_rate_is_capped() {
        let rate = Bytes::from(1u32) << 4000;
        let mut fx = Effects::new(5);
        fx.tick(&rate, ParticleDensity::Full, 80, 24);
        assert!(fx.bits().len() <= MAX_BITS);
        assert!(!fx.bits().is_empty());
    }

    #[test]
    fn test_reduced_halves_rate() {
        let rate = Bytes::from(1_000_000u32);
        let full = passive_spawn_rate(&rate, ParticleDensity::Full);
        let reduced = passive_spawn_rate(&rate, ParticleDensity::Reduced);
        assert!((full - reduced * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fades() {
        assert_eq!(bit_gray(20), 200);
        assert_eq!(bit_gray(1), 50);
        assert_eq!(bit_gray(0), 50);
        assert_eq!(cookie_gray(10), 254);
        assert_eq!(cookie_gray(0), 120);
    }
}
