//! Fixed-point decimal for prices and quantities
//!
//! Uses i64 internally with 8 decimal places precision.
//! Copy type, no allocation on the parse path, no panics.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed-point number with 8 decimal places
/// Stored as i64 where value = real_value * 100_000_000
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct FixedPoint8(i64);

impl FixedPoint8 {
    /// Number of decimal places
    pub const DECIMALS: u32 = 8;

    /// Scale factor (10^8)
    pub const SCALE: i64 = 100_000_000;

    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::SCALE);
    pub const MAX: Self = Self(i64::MAX);
    pub const MIN: Self = Self(i64::MIN);

    #[inline(always)]
    pub const fn from_raw(value: i64) -> Self {
        Self(value)
    }

    #[inline(always)]
    pub const fn as_raw(&self) -> i64 {
        self.0
    }

    /// Whole units, e.g. `from_int(42)` is 42.0
    /// Returns None if the scaled value overflows
    #[inline]
    pub const fn from_int(value: i64) -> Option<Self> {
        match value.checked_mul(Self::SCALE) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Create from f64 (config/cold path only)
    /// Returns None if value is NaN, infinite, or out of range
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * Self::SCALE as f64).round();
        if scaled > i64::MAX as f64 || scaled < i64::MIN as f64 {
            return None;
        }
        Some(Self(scaled as i64))
    }

    #[inline(always)]
    pub const fn checked_add(&self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    #[inline(always)]
    pub const fn checked_sub(&self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// price * qty through i128, None if the result leaves i64
    pub fn safe_mul(&self, other: Self) -> Option<Self> {
        let product = (self.0 as i128 * other.0 as i128) / Self::SCALE as i128;
        i64::try_from(product).ok().map(Self)
    }

    /// Parse a decimal token such as `"25000.50"`, `"-3"` or `"+.5"`.
    ///
    /// Digits beyond the 8th decimal place are truncated. Returns None for
    /// empty input, a bare sign, stray characters, more than one decimal
    /// point or overflow.
    pub fn parse_bytes(bytes: &[u8]) -> Option<Self> {
        let (negative, digits) = match bytes.first()? {
            b'-' => (true, &bytes[1..]),
            b'+' => (false, &bytes[1..]),
            _ => (false, bytes),
        };

        let (int_digits, frac_digits) = match digits.iter().position(|&b| b == b'.') {
            Some(dot) => (&digits[..dot], &digits[dot + 1..]),
            None => (digits, &digits[digits.len()..]),
        };
        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        let mut integer: i64 = 0;
        for &b in int_digits {
            if !b.is_ascii_digit() {
                return None;
            }
            integer = integer.checked_mul(10)?.checked_add((b - b'0') as i64)?;
        }

        let mut fraction: i64 = 0;
        let mut scale = Self::SCALE;
        for &b in frac_digits {
            if !b.is_ascii_digit() {
                return None;
            }
            if scale > 1 {
                scale /= 10;
                fraction += (b - b'0') as i64 * scale;
            }
        }

        let raw = integer.checked_mul(Self::SCALE)?.checked_add(fraction)?;
        Some(Self(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for FixedPoint8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        let scale = Self::SCALE as u64;
        write!(f, "{}{}.{:08}", sign, magnitude / scale, magnitude % scale)
    }
}

/// Error returned when a string is not a valid fixed-point decimal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal: {0:?}")]
pub struct InvalidDecimal(pub String);

impl FromStr for FixedPoint8 {
    type Err = InvalidDecimal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_bytes(s.as_bytes()).ok_or_else(|| InvalidDecimal(s.to_string()))
    }
}

impl Serialize for FixedPoint8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FixedPoint8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FixedPointVisitor;

        impl Visitor<'_> for FixedPointVisitor {
            type Value = FixedPoint8;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal number or decimal string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                FixedPoint8::from_int(v).ok_or_else(|| E::custom("decimal out of range"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(FixedPoint8::from_int)
                    .ok_or_else(|| E::custom("decimal out of range"))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                FixedPoint8::from_f64(v).ok_or_else(|| E::custom("decimal out of range"))
            }
        }

        deserializer.deserialize_any(FixedPointVisitor)
    }
}
