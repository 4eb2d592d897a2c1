use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::request::BacktestRequest;
use crate::models::result::BacktestResult;

/// Abstraction over the service that actually runs backtests.
///
/// The session only talks to this trait, so tests and alternative
/// transports can stand in for the hosted HTTP service.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait BacktestBackend: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Run one backtest and return its result.
    ///
    /// Transport failures, non-success statuses and unreadable bodies all
    /// come back as `Err`.
    async fn submit(&self, request: &BacktestRequest) -> Result<BacktestResult, CoreError>;
}
