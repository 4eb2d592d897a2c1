use serde::{Deserialize, Serialize};

/// Endpoint of the hosted backtest service.
pub const DEFAULT_ENDPOINT: &str = "https://backend-tester-4wzc.onrender.com/start_test/";

/// How completions of overlapping submissions are applied to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApplyPolicy {
    /// Whichever response arrives last is displayed, even if it answers an
    /// older submission.
    #[default]
    LastCompleted,

    /// Responses to submissions older than the one currently displayed are
    /// dropped.
    LatestIssued,
}

/// Client settings for a backtest session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// URL the request is POSTed to
    pub endpoint: String,

    /// Whether the per-asset return bar chart is part of the page
    pub show_per_asset_chart: bool,

    /// Ordering rule for overlapping submissions
    #[serde(default)]
    pub apply_policy: ApplyPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            show_per_asset_chart: true,
            apply_policy: ApplyPolicy::default(),
        }
    }
}
