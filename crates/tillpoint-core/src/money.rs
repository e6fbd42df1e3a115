//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The backend stores DecimalField values ("799.99") and the old web     │
//! │  client did its refund arithmetic in JavaScript numbers:               │
//! │    799.99 / 3 * 3 = 799.9899999999999  ❌ WRONG!                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    "799.99" is parsed once, at the wire boundary, into 79999 paise.    │
//! │    All pricing runs on i64 / i128 integers with explicit rounding.     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tillpoint_core::money::Money;
//!
//! let price = Money::from_paise(79_999); // ₹799.99
//! let parsed = Money::parse_decimal("799.99").unwrap();
//! assert_eq!(price, parsed);
//! assert_eq!(price.to_decimal_string(), "799.99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: replacement deltas are negative when a refund is owed
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde**: serializes as integer paise for internal/TS use; the REST
///   wire format goes through [`decimal`] instead
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(800).paise(), 80_000);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity. Prices and quantities arrive from the
    /// backend, so a product outside the `i64` range is an error.
    ///
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let unit_price = Money::from_rupees(250);
    /// assert_eq!(unit_price.multiply_quantity(3).unwrap(), Money::from_rupees(750));
    /// assert!(Money::from_paise(i64::MAX).multiply_quantity(2).is_err());
    /// ```
    pub fn multiply_quantity(&self, qty: i64) -> Result<Self, ValidationError> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or_else(|| ValidationError::Overflow {
                field: "line total".to_string(),
            })
    }

    /// Computes `self × numerator / denominator`, rounding half away from zero
    /// to the nearest paisa.
    ///
    /// Used to pro-rate a line's paid amount over part of its quantity without
    /// first truncating a per-unit price.
    ///
    /// ## Panics
    /// Never: a zero denominator yields zero.
    pub fn mul_div_round(&self, numerator: i64, denominator: i64) -> Money {
        if denominator == 0 {
            return Money::zero();
        }
        let product = self.0 as i128 * numerator as i128;
        let den = denominator as i128;
        let (p, d) = if den < 0 { (-product, -den) } else { (product, den) };
        let half = d / 2;
        let rounded = if p >= 0 { (p + half) / d } else { (p - half) / d };
        Money(rounded as i64)
    }

    /// Returns `rate` of this amount, rounded half-up to the paisa.
    ///
    /// ```rust
    /// use tillpoint_core::money::Money;
    /// use tillpoint_core::types::DiscountRate;
    ///
    /// let total = Money::from_rupees(1000);
    /// let ten_percent = DiscountRate::from_bps(1000);
    /// assert_eq!(total.percentage(ten_percent), Money::from_rupees(100));
    /// ```
    pub fn percentage(&self, rate: DiscountRate) -> Money {
        let amount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(amount as i64)
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Clamps the amount into `[low, high]`.
    #[inline]
    pub fn clamp(self, low: Money, high: Money) -> Money {
        Money(self.0.clamp(low.0, high.0.max(low.0)))
    }

    /// Parses a decimal rupee string such as `"800"`, `"799.99"` or `"-12.5"`.
    ///
    /// ## Rules
    /// - Optional leading `-` or `+`
    /// - Digits with at most one `.`
    /// - More than two fractional digits are rounded half-up on the third
    /// - Exponents, thousands separators and empty strings are rejected
    pub fn parse_decimal(raw: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("{reason}: {raw:?}"),
        };

        let trimmed = raw.trim();
        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        if body.is_empty() {
            return Err(invalid("empty amount"));
        }

        let (whole, fraction) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("not a decimal number"));
        }
        if whole.len() > 15 {
            return Err(invalid("amount too large"));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("not a decimal number"))?
        };

        let mut digits = fraction.bytes().map(|b| (b - b'0') as i64);
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().map(|d| d >= 5).unwrap_or(false);

        let mut paise = whole_value * 100 + tenths * 10 + hundredths;
        if round_up {
            paise += 1;
        }
        Ok(Money(if negative { -paise } else { paise }))
    }

    /// Formats the amount as a plain decimal string (`"800.00"`, `"-12.50"`),
    /// the format the REST backend expects.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows rupees with the ₹ sign. For debugging and the terminal desk.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Wire Format
// =============================================================================

/// Serde helpers for the REST wire format.
///
/// The backend emits decimals either as JSON numbers (`800.0`) or strings
/// (`"800.00"`). Both decode through [`Money::parse_decimal`]; numbers go
/// through their textual form so no float arithmetic touches the value.
/// Outgoing amounts are always written as decimal strings.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use tillpoint_core::money::{decimal, Money};
///
/// #[derive(Serialize, Deserialize)]
/// struct Line {
///     #[serde(with = "decimal")]
///     price: Money,
/// }
///
/// let line: Line = serde_json::from_str(r#"{"price": "12.50"}"#).unwrap();
/// assert_eq!(line.price, Money::from_paise(1250));
/// assert_eq!(serde_json::to_string(&line).unwrap(), r#"{"price":"12.50"}"#);
/// ```
pub mod decimal {
    use super::Money;
    use serde::de::{self, Deserializer};
    use serde::Serializer;
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_decimal_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let value: Value = serde::Deserialize::deserialize(deserializer)?;
        from_value(&value).map_err(de::Error::custom)
    }

    /// Decodes a JSON value (number, string or null) into Money.
    ///
    /// `null` decodes as zero: the backend sends `null` for unset totals.
    pub fn from_value(value: &Value) -> Result<Money, String> {
        match value {
            Value::Null => Ok(Money::zero()),
            Value::Number(n) => Money::parse_decimal(&n.to_string()).map_err(|e| e.to_string()),
            Value::String(s) => Money::parse_decimal(s).map_err(|e| e.to_string()),
            other => Err(format!("expected decimal amount, found {other}")),
        }
    }

    /// Same as the parent module for `Option<Money>` fields.
    pub mod option {
        use super::super::Money;
        use serde::de::{self, Deserializer};
        use serde::Serializer;
        use serde_json::Value;

        pub fn serialize<S: Serializer>(
            value: &Option<Money>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(m) => serializer.serialize_str(&m.to_decimal_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Money>, D::Error> {
            let value: Value = serde::Deserialize::deserialize(deserializer)?;
            match value {
                Value::Null => Ok(None),
                other => super::from_value(&other).map(Some).map_err(de::Error::custom),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise_and_parts() {
        let money = Money::from_paise(79_999);
        assert_eq!(money.rupees(), 799);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(80_000).to_string(), "₹800.00");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("800").unwrap().paise(), 80_000);
        assert_eq!(Money::parse_decimal("800.5").unwrap().paise(), 80_050);
        assert_eq!(Money::parse_decimal("799.99").unwrap().paise(), 79_999);
        assert_eq!(Money::parse_decimal(".75").unwrap().paise(), 75);
        assert_eq!(Money::parse_decimal("-12.50").unwrap().paise(), -1_250);
        assert_eq!(Money::parse_decimal(" 10.00 ").unwrap().paise(), 1_000);
    }

    #[test]
    fn test_parse_decimal_rounds_third_digit() {
        assert_eq!(Money::parse_decimal("10.005").unwrap().paise(), 1_001);
        assert_eq!(Money::parse_decimal("10.004").unwrap().paise(), 1_000);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal("-").is_err());
        assert!(Money::parse_decimal(".").is_err());
        assert!(Money::parse_decimal("1e3").is_err());
        assert!(Money::parse_decimal("1,000").is_err());
        assert!(Money::parse_decimal("abc").is_err());
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_paise(80_000).to_decimal_string(), "800.00");
        assert_eq!(Money::from_paise(-1_250).to_decimal_string(), "-12.50");
        assert_eq!(Money::from_paise(5).to_decimal_string(), "0.05");
    }

    #[test]
    fn test_mul_div_round() {
        // ₹1000 paid for 3 units, 1 unit returned: 333.333.. → 333.33
        let paid = Money::from_rupees(1000);
        assert_eq!(paid.mul_div_round(1, 3).paise(), 33_333);
        // ₹1000 for 3 units, 2 units: 666.666.. → 666.67
        assert_eq!(paid.mul_div_round(2, 3).paise(), 66_667);
        assert_eq!(paid.mul_div_round(3, 3), paid);
        assert_eq!(paid.mul_div_round(1, 0), Money::zero());
        assert_eq!(Money::from_paise(-100).mul_div_round(1, 3).paise(), -33);
    }

    #[test]
    fn test_multiply_quantity_overflow() {
        let huge = Money::from_paise(i64::MAX / 2 + 1);
        assert!(matches!(
            huge.multiply_quantity(2),
            Err(ValidationError::Overflow { .. })
        ));
        assert!(Money::from_paise(i64::MIN).multiply_quantity(-1).is_err());
        assert_eq!(
            Money::from_paise(i64::MAX / 2).multiply_quantity(2).unwrap(),
            Money::from_paise(i64::MAX - 1)
        );
    }

    #[test]
    fn test_percentage() {
        let total = Money::from_rupees(1000);
        assert_eq!(total.percentage(DiscountRate::from_bps(1000)).paise(), 10_000);
        assert_eq!(total.percentage(DiscountRate::from_bps(1250)).paise(), 12_500);
        assert_eq!(Money::from_paise(999).percentage(DiscountRate::from_bps(5000)).paise(), 500);
    }

    #[test]
    fn test_min_and_clamp() {
        let a = Money::from_rupees(1500);
        let b = Money::from_rupees(1000);
        assert_eq!(a.min(b), b);
        assert_eq!(Money::from_rupees(-5).clamp(Money::zero(), b), Money::zero());
        assert_eq!(a.clamp(Money::zero(), b), b);
    }

    #[test]
    fn test_wire_decoding_accepts_numbers_and_strings() {
        use serde_json::json;
        assert_eq!(decimal::from_value(&json!(800)).unwrap().paise(), 80_000);
        assert_eq!(decimal::from_value(&json!(799.99)).unwrap().paise(), 79_999);
        assert_eq!(decimal::from_value(&json!("799.99")).unwrap().paise(), 79_999);
        assert_eq!(decimal::from_value(&json!(null)).unwrap(), Money::zero());
        assert!(decimal::from_value(&json!(true)).is_err());
        assert!(decimal::from_value(&json!({"amount": 1})).is_err());
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_rupees(1), Money::from_rupees(2)].into_iter().sum();
        assert_eq!(total, Money::from_rupees(3));
    }
}
