//! Render-time number formatting.
//!
//! Metric values stay unrounded `f64` inside the simulator. Rounding to the
//! per-metric precision happens here, through `Decimal`, only when a value is
//! turned into display text.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Display style of a metric, with its fixed decimal precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum MetricFormat {
    /// Value already expressed in percent units (42.5 renders as `42.5%`).
    Percent { decimals: u32 },
    Currency { symbol: String, decimals: u32 },
    Number { decimals: u32 },
    /// Ratio rendered with a trailing `x`.
    Multiplier { decimals: u32 },
}

impl MetricFormat {
    pub fn percent(decimals: u32) -> Self {
        Self::Percent { decimals }
    }

    pub fn usd(decimals: u32) -> Self {
        Self::Currency { symbol: "$".to_string(), decimals }
    }

    pub fn number(decimals: u32) -> Self {
        Self::Number { decimals }
    }

    pub fn multiplier(decimals: u32) -> Self {
        Self::Multiplier { decimals }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Self::Percent { decimals }
            | Self::Currency { decimals, .. }
            | Self::Number { decimals }
            | Self::Multiplier { decimals } => *decimals,
        }
    }

    pub fn render(&self, value: f64) -> String {
        let rounded = round_for_display(value, self.decimals());
        match self {
            Self::Percent { .. } => format!("{}%", rounded),
            Self::Currency { symbol, .. } => {
                if rounded.is_sign_negative() && !rounded.is_zero() {
                    format!("-{}{}", symbol, group_thousands(&rounded.abs().to_string()))
                } else {
                    format!("{}{}", symbol, group_thousands(&rounded.to_string()))
                }
            }
            Self::Number { .. } => group_thousands(&rounded.to_string()),
            Self::Multiplier { .. } => format!("{}x", rounded),
        }
    }
}

/// Round half away from zero to `decimals` places and pin the scale so
/// trailing zeros are kept (`2.5` at two places prints `2.50`).
///
/// Non-finite values render as zero; the simulator never publishes them.
pub fn round_for_display(value: f64, decimals: u32) -> Decimal {
    let mut d = Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    d.rescale(decimals);
    if d.is_zero() {
        d.set_sign_positive(true);
    }
    d
}

fn group_thousands(plain: &str) -> String {
    let (sign, digits) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_for_display(42.25, 1), dec!(42.3));
        assert_eq!(round_for_display(-42.25, 1), dec!(-42.3));
        assert_eq!(round_for_display(0.125, 2), dec!(0.13));
    }

    #[test]
    fn keeps_trailing_zeros() {
        assert_eq!(round_for_display(2.5, 2).to_string(), "2.50");
        assert_eq!(round_for_display(7.0, 1).to_string(), "7.0");
        assert_eq!(round_for_display(7.0, 0).to_string(), "7");
    }

    #[test]
    fn negative_zero_is_normalised() {
        assert_eq!(round_for_display(-0.004, 2).to_string(), "0.00");
        assert_eq!(MetricFormat::usd(2).render(-0.001), "$0.00");
    }

    #[test]
    fn percent_and_multiplier() {
        assert_eq!(MetricFormat::percent(1).render(42.25), "42.3%");
        assert_eq!(MetricFormat::percent(0).render(100.0), "100%");
        assert_eq!(MetricFormat::multiplier(1).render(2.375), "2.4x");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(MetricFormat::usd(2).render(1234567.5), "$1,234,567.50");
        assert_eq!(MetricFormat::usd(0).render(999.0), "$999");
        assert_eq!(MetricFormat::usd(0).render(-1200.0), "-$1,200");
    }

    #[test]
    fn plain_numbers_group_too() {
        assert_eq!(MetricFormat::number(0).render(12000.0), "12,000");
        assert_eq!(MetricFormat::number(1).render(-4321.25), "-4,321.3");
    }

    #[test]
    fn non_finite_renders_as_zero() {
        assert_eq!(MetricFormat::number(1).render(f64::NAN), "0.0");
    }

    #[test]
    fn format_json_shape() {
        let f: MetricFormat =
            serde_json::from_str(r#"{"style":"currency","symbol":"€","decimals":2}"#)
                .expect("test: valid format json");
        assert_eq!(f.render(10.0), "€10.00");
        assert_eq!(f.decimals(), 2);
    }
}
