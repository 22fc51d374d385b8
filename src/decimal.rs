//! A 96-bit scaled decimal value.
//!
//! The representation is four little-endian 32-bit words: `lo`/`mid`/`hi`
//! hold the unsigned 96-bit mantissa and `flags` holds the scale (bits
//! 16..24, at most [`Decimal::MAX_SCALE`]) and the sign (bit 31). The binary
//! backend writes the four words verbatim; the text backend goes through
//! [`Display`]/[`FromStr`].
//!
//! [`Display`]: core::fmt::Display
//! [`FromStr`]: core::str::FromStr

use core::fmt;
use core::str::FromStr;

use crate::impls::impl_reflect_opaque;

const SCALE_SHIFT: u32 = 16;
const SCALE_MASK: u32 = 0x00FF_0000;
const SIGN_MASK: u32 = 0x8000_0000;

/// A decimal number with a 96-bit mantissa and a power-of-ten scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decimal {
    lo: u32,
    mid: u32,
    hi: u32,
    flags: u32,
}

impl Decimal {
    /// The largest representable scale (number of fractional digits).
    pub const MAX_SCALE: u8 = 28;

    /// Zero with scale zero.
    pub const ZERO: Self = Self {
        lo: 0,
        mid: 0,
        hi: 0,
        flags: 0,
    };

    /// Builds a decimal from its four raw words.
    ///
    /// Returns `None` when `flags` carries a scale above [`Self::MAX_SCALE`]
    /// or sets any bit outside the scale and sign fields.
    pub fn from_words(lo: u32, mid: u32, hi: u32, flags: u32) -> Option<Self> {
        if flags & !(SCALE_MASK | SIGN_MASK) != 0 {
            return None;
        }
        if (flags & SCALE_MASK) >> SCALE_SHIFT > u32::from(Self::MAX_SCALE) {
            return None;
        }
        Some(Self { lo, mid, hi, flags })
    }

    /// Builds a decimal from an unsigned mantissa, sign, and scale.
    ///
    /// Returns `None` when the mantissa exceeds 96 bits or the scale exceeds
    /// [`Self::MAX_SCALE`].
    pub fn from_parts(mantissa: u128, negative: bool, scale: u8) -> Option<Self> {
        if mantissa >> 96 != 0 || scale > Self::MAX_SCALE {
            return None;
        }
        let mut flags = u32::from(scale) << SCALE_SHIFT;
        if negative {
            flags |= SIGN_MASK;
        }
        Some(Self {
            lo: mantissa as u32,
            mid: (mantissa >> 32) as u32,
            hi: (mantissa >> 64) as u32,
            flags,
        })
    }

    /// Builds an integral decimal.
    pub fn from_i64(value: i64) -> Self {
        let mantissa = value.unsigned_abs() as u128;
        // A 64-bit magnitude always fits in 96 bits with scale zero.
        Self::from_parts(mantissa, value < 0, 0).unwrap_or(Self::ZERO)
    }

    /// Returns the low mantissa word.
    #[inline]
    pub const fn lo(&self) -> u32 {
        self.lo
    }

    /// Returns the middle mantissa word.
    #[inline]
    pub const fn mid(&self) -> u32 {
        self.mid
    }

    /// Returns the high mantissa word.
    #[inline]
    pub const fn hi(&self) -> u32 {
        self.hi
    }

    /// Returns the flags word (scale and sign).
    #[inline]
    pub const fn flags(&self) -> u32 {
        self.flags
    }

    /// Returns the number of fractional digits.
    #[inline]
    pub const fn scale(&self) -> u8 {
        ((self.flags & SCALE_MASK) >> SCALE_SHIFT) as u8
    }

    /// Whether the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.flags & SIGN_MASK != 0
    }

    /// Returns the unsigned 96-bit mantissa.
    #[inline]
    pub const fn mantissa(&self) -> u128 {
        self.lo as u128 | (self.mid as u128) << 32 | (self.hi as u128) << 64
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        let scale = usize::from(self.scale());
        if scale == 0 {
            return write!(f, "{}", self.mantissa());
        }
        let digits = format!("{:0>width$}", self.mantissa(), width = scale + 1);
        let split = digits.len() - scale;
        write!(f, "{}.{}", &digits[..split], &digits[split..])
    }
}

/// The error returned when parsing a [`Decimal`] from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal literal: {0}")]
pub struct ParseDecimalError(String);

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseDecimalError(s.to_owned());
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (integral, fractional) = match body.split_once('.') {
            Some((integral, fractional)) => (integral, fractional),
            None => (body, ""),
        };
        if integral.is_empty() && fractional.is_empty() {
            return Err(invalid());
        }
        let mut mantissa: u128 = 0;
        for ch in integral.chars().chain(fractional.chars()) {
            let digit = ch.to_digit(10).ok_or_else(invalid)?;
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(digit)))
                .ok_or_else(invalid)?;
        }
        let scale = u8::try_from(fractional.len()).map_err(|_| invalid())?;
        Self::from_parts(mantissa, negative, scale).ok_or_else(invalid)
    }
}

impl_reflect_opaque!(Decimal, path: "graphwire::Decimal", name: "Decimal");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_inserts_the_point_at_the_scale() {
        let d = Decimal::from_parts(123_450, false, 3).unwrap();
        assert_eq!(d.to_string(), "123.450");
        let d = Decimal::from_parts(5, true, 4).unwrap();
        assert_eq!(d.to_string(), "-0.0005");
        assert_eq!(Decimal::from_i64(-42).to_string(), "-42");
    }

    #[test]
    fn parse_round_trips_words() {
        let d: Decimal = "-123.450".parse().unwrap();
        assert_eq!(d.mantissa(), 123_450);
        assert_eq!(d.scale(), 3);
        assert!(d.is_negative());
        let back = Decimal::from_words(d.lo(), d.mid(), d.hi(), d.flags()).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn limits_are_enforced() {
        assert!(Decimal::from_parts(1_u128 << 97, false, 0).is_none());
        assert!(Decimal::from_parts(1, false, 29).is_none());
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!("".parse::<Decimal>().is_err());
        assert!(Decimal::from_words(0, 0, 0, 0x0000_0001).is_none());
    }
}
