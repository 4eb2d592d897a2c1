use std::fmt;

use serde::{Deserialize, Serialize};

/// X-axis label of a chart point: a 1-based period number for the
/// portfolio line chart, a ticker for the per-asset bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartLabel {
    Index(usize),
    Key(String),
}

impl fmt::Display for ChartLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartLabel::Index(i) => write!(f, "{i}"),
            ChartLabel::Key(k) => f.write_str(k),
        }
    }
}

/// A single data point for chart rendering.
///
/// The core generates these; the frontend just renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Category or period shown on the x-axis
    pub label: ChartLabel,

    /// Value rounded to two fraction digits
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: ChartLabel, value: f64) -> Self {
        Self { label, value }
    }

    /// Point of a period series, labelled with its 1-based position.
    pub fn index(position: usize, value: f64) -> Self {
        Self::new(ChartLabel::Index(position), value)
    }

    /// Point of a category series, labelled with its key.
    pub fn key(key: impl Into<String>, value: f64) -> Self {
        Self::new(ChartLabel::Key(key.into()), value)
    }
}
