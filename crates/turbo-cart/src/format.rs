//! Presentation formatting for prices.
//!
//! Formatting never feeds back into pricing; it only renders an `f64`.

use serde::{Deserialize, Serialize};

/// How to render a price: decimal count and separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceFormat {
    /// Number of decimals.
    pub decimals: usize,
    /// Separator between whole and fractional part.
    pub decimal_point: String,
    /// Separator between groups of three digits.
    pub thousands_separator: String,
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            decimals: 2,
            decimal_point: ".".to_string(),
            thousands_separator: ",".to_string(),
        }
    }
}

impl PriceFormat {
    /// Create a format.
    pub fn new(
        decimals: usize,
        decimal_point: impl Into<String>,
        thousands_separator: impl Into<String>,
    ) -> Self {
        Self {
            decimals,
            decimal_point: decimal_point.into(),
            thousands_separator: thousands_separator.into(),
        }
    }

    /// Format an amount (e.g. `1234.5` -> `"1,234.50"`).
    pub fn format(&self, amount: f64) -> String {
        let places = self.decimals;
        let rendered = format!("{:.places$}", amount.abs());
        let (whole, fraction) = match rendered.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (rendered.as_str(), None),
        };

        let mut grouped = String::with_capacity(rendered.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push_str(&self.thousands_separator);
            }
            grouped.push(digit);
        }
        if let Some(fraction) = fraction {
            grouped.push_str(&self.decimal_point);
            grouped.push_str(fraction);
        }

        let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
        if amount < 0.0 && !is_zero {
            grouped.insert(0, '-');
        }
        grouped
    }
}
