//! Big-integer helpers for the simulation.
//!
//! All progress and cost values are unbounded unsigned integers. Late-game
//! counters pass 2^64 quickly (the top upgrade alone costs 1024^9 bytes), so
//! nothing in the economy is allowed to touch `u64` or floating point.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

/// Arbitrary-precision byte count.
pub type Bytes = BigUint;

/// A compile-time amount expressed as `coefficient × 1024^power`.
///
/// Data tables use this so that values above `u64::MAX` can still be
/// written as constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Magnitude {
    /// Multiplier applied to the power of 1024.
    pub coefficient: u64,
    /// Exponent of 1024.
    pub kib_power: u32,
}

impl Magnitude {
    /// Create a new magnitude.
    #[must_use]
    pub const fn new(coefficient: u64, kib_power: u32) -> Self {
        Self {
            coefficient,
            kib_power,
        }
    }

    /// Plain byte amount (power zero).
    #[must_use]
    pub const fn bytes(coefficient: u64) -> Self {
        Self::new(coefficient, 0)
    }

    /// Expand to a [`Bytes`] value.
    #[must_use]
    pub fn to_bytes(self) -> Bytes {
        Bytes::from(self.coefficient) << (10 * self.kib_power as usize)
    }
}

/// `1024^power` as a big integer.
#[must_use]
pub fn kib_pow(power: u32) -> Bytes {
    Bytes::one() << (10 * power as usize)
}

/// `value × numerator / denominator`, rounded up.
#[must_use]
pub fn mul_ratio_ceil(value: &Bytes, numerator: u32, denominator: u32) -> Bytes {
    debug_assert!(denominator > 0);
    let denominator = Bytes::from(denominator);
    (value * numerator + &denominator - 1u32) / denominator
}

/// `value × percent / 100`, rounded down.
#[must_use]
pub fn mul_percent_floor(value: &Bytes, percent: u32) -> Bytes {
    value * percent / 100u32
}

/// Lossy conversion for display and effect density only.
#[must_use]
pub fn approx_f64(value: &Bytes) -> f64 {
    value.to_f64().unwrap_or(f64::MAX)
}

/// True when the value is zero.
#[must_use]
pub fn is_zero(value: &Bytes) -> bool {
    value.is_zero()
}

/// Serde support for [`Bytes`] as decimal strings.
///
/// JSON numbers lose precision past 2^53 in most readers, so counters are
/// written as strings. Plain integers are accepted on read.
pub mod bytes_string {
    use super::Bytes;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    /// Serialize a byte count as its decimal representation.
    pub fn serialize<S>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    /// Deserialize a byte count from a decimal string or an unsigned integer.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl Visitor<'_> for DecimalVisitor {
            type Value = Bytes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a non-negative decimal integer string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Bytes, E> {
                Bytes::parse_bytes(v.trim().as_bytes(), 10)
                    .ok_or_else(|| E::custom(format!("invalid decimal integer: {v:?}")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Bytes, E> {
                Ok(Bytes::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Bytes, E> {
                u64::try_from(v)
                    .map(Bytes::from)
                    .map_err(|_| E::custom("negative byte count"))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}
