use serde::{Deserialize, Serialize};

/// Request body sent to the backtest service.
///
/// `years` and `initial_investment` are `None` when the form text did not
/// parse; they go over the wire as JSON `null` and the backend decides what
/// to do with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    /// Strategy identifier (meaning owned by the backend)
    pub method: String,

    /// Backtest horizon in years
    pub years: Option<i64>,

    /// Tickers in the order they were added
    #[serde(rename = "stocks")]
    pub tickers: Vec<String>,

    /// Amount invested at the start of the backtest.
    /// The wire key is spelled `initial_investiment` by the backend.
    #[serde(rename = "initial_investiment")]
    pub initial_investment: Option<f64>,
}
