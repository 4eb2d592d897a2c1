use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::chart::ChartPoint;
use crate::models::result::PerAssetReturns;

/// Decimal places shown on every chart value and on the final amount.
pub const CHART_DECIMALS: u32 = 2;

/// Generates chart-ready data sets from a backtest result.
///
/// The core computes all the numbers; the frontend only renders.
/// - Line chart: one point per period, labelled 1, 2, 3, ...
/// - Bar chart: one point per asset, labelled with its ticker
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Cumulative portfolio returns as a line series.
    /// Point order follows the input order; labels are 1-based.
    #[must_use]
    pub fn to_line_chart_data(&self, periodic_returns: &[f64]) -> Vec<ChartPoint> {
        periodic_returns
            .iter()
            .enumerate()
            .map(|(i, value)| ChartPoint::index(i + 1, round(*value, CHART_DECIMALS)))
            .collect()
    }

    /// Per-asset returns as bar categories, in the order the backend sent them.
    #[must_use]
    pub fn to_bar_chart_data(&self, per_asset_returns: &PerAssetReturns) -> Vec<ChartPoint> {
        per_asset_returns
            .iter()
            .map(|(ticker, value)| ChartPoint::key(ticker, round(value, CHART_DECIMALS)))
            .collect()
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}

/// Round `value` to `decimals` fraction digits, ties away from zero.
///
/// Rounding works on the shortest decimal text that reads back as `value`,
/// not on its binary expansion. `1.005` is stored as 1.00499999..., but it
/// prints as "1.005" and therefore rounds to 1.01. Likewise
/// `round(2.345, 2) == 2.35` and `round(-2.345, 2) == -2.35`.
///
/// NaN and infinities are returned unchanged. Magnitudes too large for an
/// exact decimal fall back to `f64::round`, which also rounds ties away from zero.
#[must_use]
pub fn round(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    match Decimal::from_str(&value.to_string()) {
        Ok(exact) => exact
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
            .to_string()
            .parse()
            .unwrap_or(value),
        Err(_) => {
            let factor = 10f64.powi(decimals as i32);
            let scaled = value * factor;
            // Past 2^52 every f64 is already a whole number.
            if scaled.abs() < 4_503_599_627_370_496.0 {
                scaled.round() / factor
            } else {
                value
            }
        }
    }
}
