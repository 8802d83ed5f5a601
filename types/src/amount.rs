//! Fixed-point token amounts.
//!
//! An [`Amount`] is a non-negative integer count of the smallest unit together
//! with the number of decimal places that unit represents. `Amount::new(12345, 2)`
//! is `123.45`. Arithmetic and comparison are only defined between amounts of the
//! same scale; there is no floating-point tolerance anywhere.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Largest supported scale. `10^38` still fits in a `u128`, but values at that
/// scale would have no integer headroom.
pub const MAX_SCALE: u8 = 18;

/// A fixed-point decimal amount with an explicit scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    raw: u128,
    scale: u8,
}

impl Amount {
    pub fn new(raw: u128, scale: u8) -> Self {
        Self { raw, scale }
    }

    pub fn zero(scale: u8) -> Self {
        Self { raw: 0, scale }
    }

    /// Parse a decimal string such as `"100"`, `"12.5"` or `"0.01"` at `scale`.
    ///
    /// Fewer fractional digits than `scale` are padded; more are rejected rather
    /// than rounded. Signs are rejected.
    pub fn parse(input: &str, scale: u8) -> Result<Self, TypesError> {
        if scale > MAX_SCALE {
            return Err(TypesError::ScaleTooLarge(scale));
        }
        let s = input.trim();
        if s.starts_with('-') {
            return Err(TypesError::InvalidAmount(format!("{s} is negative")));
        }
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(TypesError::InvalidAmount(format!("'{s}' has no digits")));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(TypesError::InvalidAmount(format!("'{s}' is not a decimal number")));
        }
        if frac_part.len() > scale as usize {
            return Err(TypesError::InvalidAmount(format!(
                "{s} has more than {scale} fractional digits"
            )));
        }

        let overflow = || TypesError::InvalidAmount(format!("{s} is too large"));
        let unit = 10u128.pow(scale as u32);
        let int_value: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let frac_value: u128 = if frac_part.is_empty() {
            0
        } else {
            let padding = 10u128.pow((scale as usize - frac_part.len()) as u32);
            let digits: u128 = frac_part.parse().map_err(|_| overflow())?;
            digits * padding
        };
        let raw = int_value
            .checked_mul(unit)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(overflow)?;
        Ok(Self { raw, scale })
    }

    pub fn raw(&self) -> u128 {
        self.raw
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// `None` on overflow or when the scales differ.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.scale != other.scale {
            return None;
        }
        self.raw.checked_add(other.raw).map(|raw| Self { raw, scale: self.scale })
    }

    /// `None` when the result would be negative or when the scales differ.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        if self.scale != other.scale {
            return None;
        }
        self.raw.checked_sub(other.raw).map(|raw| Self { raw, scale: self.scale })
    }

    /// Sum amounts that all share `scale`. `None` on overflow or scale mismatch.
    pub fn checked_sum<'a, I>(amounts: I, scale: u8) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Self::zero(scale), |acc, a| acc.checked_add(*a))
    }
}

impl PartialOrd for Amount {
    /// Amounts at different scales are incomparable.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.scale != other.scale {
            return None;
        }
        Some(self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.raw);
        }
        let unit = 10u128.pow(self.scale as u32);
        write!(
            f,
            "{}.{:0width$}",
            self.raw / unit,
            self.raw % unit,
            width = self.scale as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pads_missing_fraction_digits() {
        assert_eq!(Amount::parse("100", 2).unwrap(), Amount::new(10_000, 2));
        assert_eq!(Amount::parse("12.5", 2).unwrap(), Amount::new(1_250, 2));
        assert_eq!(Amount::parse("0.01", 2).unwrap(), Amount::new(1, 2));
        assert_eq!(Amount::parse(".75", 2).unwrap(), Amount::new(75, 2));
    }

    #[test]
    fn parse_rejects_excess_precision() {
        let err = Amount::parse("1.234", 2).unwrap_err();
        assert!(matches!(err, TypesError::InvalidAmount(_)));
    }

    #[test]
    fn parse_rejects_signs_and_garbage() {
        assert!(Amount::parse("-5", 2).is_err());
        assert!(Amount::parse("1e3", 2).is_err());
        assert!(Amount::parse("", 2).is_err());
        assert!(Amount::parse(".", 2).is_err());
        assert!(Amount::parse("1.2.3", 2).is_err());
    }

    #[test]
    fn parse_rejects_overflow() {
        let huge = "9".repeat(40);
        assert!(Amount::parse(&huge, 2).is_err());
    }

    #[test]
    fn parse_rejects_scale_beyond_max() {
        assert_eq!(
            Amount::parse("1", MAX_SCALE + 1),
            Err(TypesError::ScaleTooLarge(MAX_SCALE + 1))
        );
    }

    #[test]
    fn display_uses_declared_scale() {
        assert_eq!(Amount::new(10_000, 2).to_string(), "100.00");
        assert_eq!(Amount::new(5, 2).to_string(), "0.05");
        assert_eq!(Amount::new(42, 0).to_string(), "42");
    }

    #[test]
    fn arithmetic_requires_matching_scale() {
        let a = Amount::new(100, 2);
        let b = Amount::new(100, 3);
        assert_eq!(a.checked_add(b), None);
        assert_eq!(a.checked_sub(b), None);
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn checked_sub_refuses_negative_results() {
        let small = Amount::new(30, 2);
        let large = Amount::new(50, 2);
        assert_eq!(small.checked_sub(large), None);
        assert_eq!(large.checked_sub(small), Some(Amount::new(20, 2)));
    }

    #[test]
    fn checked_sum_totals_same_scale_amounts() {
        let amounts = [Amount::new(100, 2), Amount::new(250, 2)];
        assert_eq!(Amount::checked_sum(&amounts, 2), Some(Amount::new(350, 2)));
        assert_eq!(Amount::checked_sum(&[], 2), Some(Amount::zero(2)));
        assert_eq!(Amount::checked_sum(&amounts, 3), None);
    }
}
