//! Fixed-point math utilities for deterministic combat resolution.
//!
//! Combat ratios are computed in fixed point so that rounding decisions are
//! identical on every platform. Floating-point division can land on either
//! side of an exact integer boundary depending on the CPU and compiler.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Fixed-point ratio `num / den`, truncated to `I32F32` precision.
///
/// Returns `None` if `den` is zero or the quotient overflows.
#[must_use]
pub fn ratio(num: i64, den: i64) -> Option<Fixed> {
    if den == 0 {
        return None;
    }
    let num = Fixed::checked_from_num(num)?;
    let den = Fixed::checked_from_num(den)?;
    num.checked_div(den)
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}
