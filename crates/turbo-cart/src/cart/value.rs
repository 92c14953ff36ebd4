//! Condition value grammar and the application formula.

use crate::error::CartError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed, optionally percentage, magnitude such as `"-10%"`, `"+5"` or
/// `"7.5%"`.
///
/// Grammar: `[+|-]digits[.digits][%]`. A missing sign is additive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValueSpec {
    raw: String,
    magnitude: f64,
    percentage: bool,
    subtracts: bool,
}

/// Outcome of applying a value to a base amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    /// Resulting amount, never below zero.
    pub amount: f64,
    /// Unsigned amount added or removed, before clamping.
    pub calculated_value: f64,
    /// Whether the calculated value was subtracted.
    pub subtracts: bool,
}

impl Adjustment {
    /// The calculated value with its sign.
    pub fn signed_delta(&self) -> f64 {
        if self.subtracts {
            -self.calculated_value
        } else {
            self.calculated_value
        }
    }
}

impl ValueSpec {
    /// Parse a value.
    pub fn parse(input: &str) -> Result<Self, CartError> {
        let raw = input.trim();
        let invalid = || CartError::validation(format!("invalid condition value: {input:?}"));

        let (subtracts, rest) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };
        let (percentage, number) = match rest.strip_suffix('%') {
            Some(number) => (true, number),
            None => (false, rest),
        };

        let (whole, fraction) = match number.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (number, None),
        };
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || fraction.is_some_and(|f| !all_digits(f)) {
            return Err(invalid());
        }
        let magnitude: f64 = number.parse().map_err(|_| invalid())?;
        if !magnitude.is_finite() {
            return Err(invalid());
        }

        Ok(Self {
            raw: raw.to_string(),
            magnitude,
            percentage,
            subtracts,
        })
    }

    /// Apply to `base`.
    ///
    /// A percentage is taken of `base`; a plain number is used as is. The
    /// result is clamped at zero.
    pub fn apply(&self, base: f64) -> Adjustment {
        let calculated_value = if self.percentage {
            base * (self.magnitude / 100.0)
        } else {
            self.magnitude
        };
        let amount = if self.subtracts {
            base - calculated_value
        } else {
            base + calculated_value
        };
        Adjustment {
            amount: amount.max(0.0),
            calculated_value,
            subtracts: self.subtracts,
        }
    }

    /// The number without sign or percent marker.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Whether the value is a percentage of the base.
    pub fn is_percentage(&self) -> bool {
        self.percentage
    }

    /// Whether the value lowers the base.
    pub fn is_subtraction(&self) -> bool {
        self.subtracts
    }

    /// The value as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::str::FromStr for ValueSpec {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ValueSpec {
    type Error = CartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ValueSpec> for String {
    fn from(value: ValueSpec) -> Self {
        value.raw
    }
}

impl fmt::Display for ValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_percentage_discount() {
        let adj = ValueSpec::parse("-10%").unwrap().apply(100.0);
        assert!(approx(adj.amount, 90.0));
        assert!(approx(adj.calculated_value, 10.0));
        assert!(approx(adj.signed_delta(), -10.0));
    }

    #[test]
    fn test_fixed_fee() {
        let adj = ValueSpec::parse("+5").unwrap().apply(90.0);
        assert!(approx(adj.amount, 95.0));
        assert!(approx(adj.calculated_value, 5.0));
        assert!(!adj.subtracts);
    }

    #[test]
    fn test_unsigned_percentage_is_additive() {
        let adj = ValueSpec::parse("50%").unwrap().apply(100.0);
        assert!(approx(adj.amount, 150.0));
    }

    #[test]
    fn test_unsigned_number_is_additive() {
        assert!(approx(ValueSpec::parse("2.5").unwrap().apply(10.0).amount, 12.5));
    }

    #[test]
    fn test_clamped_at_zero() {
        let adj = ValueSpec::parse("-1000").unwrap().apply(10.0);
        assert_eq!(adj.amount, 0.0);
        // The calculated value keeps the pre-clamp delta
        assert!(approx(adj.calculated_value, 1000.0));
    }

    #[test]
    fn test_percentage_of_zero_base() {
        let adj = ValueSpec::parse("10%").unwrap().apply(0.0);
        assert_eq!(adj.amount, 0.0);
        assert_eq!(adj.calculated_value, 0.0);
    }

    #[test]
    fn test_parse_flags() {
        let v = ValueSpec::parse(" -12.5% ").unwrap();
        assert!(v.is_subtraction());
        assert!(v.is_percentage());
        assert!(approx(v.magnitude(), 12.5));
        assert_eq!(v.as_str(), "-12.5%");
    }

    #[test]
    fn test_rejects_malformed_values() {
        for bad in ["", "%", "-", "abc", "10%%", "1.2.3", ".5", "5.", "--5", "5-", "1e3", "+ 5"] {
            assert!(ValueSpec::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_rejects_overflowing_magnitude() {
        let huge = format!("1{}", "0".repeat(400));
        for raw in [huge.clone(), format!("-{huge}%"), format!("+{huge}.5")] {
            assert!(matches!(
                ValueSpec::parse(&raw),
                Err(CartError::Validation(_))
            ));
        }
        assert!(ValueSpec::parse(&format!("1{}", "0".repeat(300))).is_ok());
    }

    #[test]
    fn test_serializes_as_written() {
        let v = ValueSpec::parse("-10%").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), r#""-10%""#);
        let back: ValueSpec = serde_json::from_str(r#""-10%""#).unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_str::<ValueSpec>(r#""ten""#).is_err());
    }
}
