use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Outcome of a backtest as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Portfolio value at the end of the backtest
    #[serde(rename = "montante_final")]
    pub final_amount: f64,

    /// Cumulative portfolio return per period, oldest first
    #[serde(rename = "portifolio_returns")]
    pub periodic_returns: Vec<f64>,

    /// Return of each asset over the whole backtest.
    /// Absent in responses from backends that don't break returns down.
    #[serde(
        rename = "return_per_stock",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub per_asset_returns: Option<PerAssetReturns>,
}

/// Per-asset returns in the order the backend listed them.
///
/// A JSON object is read entry by entry so the document order survives.
/// A key repeated later in the object keeps its first position and takes
/// the later value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerAssetReturns {
    entries: Vec<(String, f64)>,
}

impl PerAssetReturns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value; new keys go to the end.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PerAssetReturns {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut returns = Self::new();
        for (k, v) in iter {
            returns.insert(k, v);
        }
        returns
    }
}

impl Serialize for PerAssetReturns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct PerAssetReturnsVisitor;

impl<'de> Visitor<'de> for PerAssetReturnsVisitor {
    type Value = PerAssetReturns;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping tickers to numeric returns")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut returns = PerAssetReturns {
            entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
        };
        while let Some((key, value)) = access.next_entry::<String, f64>()? {
            returns.insert(key, value);
        }
        Ok(returns)
    }
}

impl<'de> Deserialize<'de> for PerAssetReturns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PerAssetReturnsVisitor)
    }
}
