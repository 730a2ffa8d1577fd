//! Small seeded PRNG for cosmetic effects.
//!
//! Not suitable for anything but particles: it is a plain LCG. Each session
//! seeds its own so tests can replay effects exactly.

/// Linear congruential generator.
#[derive(Debug, Clone)]
pub struct EffectRng {
    state: u64,
}

impl EffectRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Next raw value. Only the upper 31 bits are well mixed.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(0x5DEE_CE66D).wrapping_add(11);
        (self.state >> 33) as u32
    }

    /// Uniform-ish float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(1u32 << 31)
    }

    /// Value in `[min, max)`; returns `min` for an empty range.
    pub fn next_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let range = (i64::from(max) - i64::from(min)) as u64;
        min + (u64::from(self.next_u32()) % range) as i32
    }

    /// Fair coin.
    pub fn next_bool(&mut self) -> bool {
        self.next_u32() & (1 << 30) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = EffectRng::new(7);
        let mut b = EffectRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_range_bounds() {
        let mut rng = EffectRng::new(42);
        for _ in 0..1000 {
            let v = rng.next_range(-15, 40);
            assert!((-15..40).contains(&v));
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
        }
        assert_eq!(rng.next_range(5, 5), 5);
    }

    #[test]
    fn test_bool_is_not_constant() {
        let mut rng = EffectRng::new(1);
        let trues = (0..200).filter(|_| rng.next_bool()).count();
        assert!(trues > 20 && trues < 180);
    }
}
