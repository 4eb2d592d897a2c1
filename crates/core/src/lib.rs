pub mod backend;
pub mod errors;
pub mod models;
pub mod services;

use std::sync::Arc;

use backend::http::HttpBackend;
use backend::traits::BacktestBackend;
use models::{
    chart::ChartPoint,
    form::FormState,
    page::{Completion, LastError, PagePhase},
    request::BacktestRequest,
    result::BacktestResult,
    settings::{ApplyPolicy, Settings},
};
use services::{
    chart_service::{round, ChartService, CHART_DECIMALS},
    request_service::RequestService,
};

use errors::CoreError;

/// A submission that has been issued but not yet completed.
///
/// Carries the request snapshot taken at submit time, so the form can keep
/// changing while the request is in flight. Hand it back to
/// [`BacktestSession::complete_submission`] together with the backend's answer.
#[derive(Debug)]
#[must_use]
pub struct Submission {
    seq: u64,
    request: BacktestRequest,
}

impl Submission {
    /// Sequence number, increasing with every submission of the session.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &BacktestRequest {
        &self.request
    }
}

/// Main entry point for the backtest client core library.
/// Holds the page state (form + latest result) and the services operating on it.
#[must_use]
pub struct BacktestSession {
    form: FormState,
    result: Option<BacktestResult>,
    last_error: Option<LastError>,
    settings: Settings,
    backend: Arc<dyn BacktestBackend>,
    request_service: RequestService,
    chart_service: ChartService,
    next_seq: u64,
    /// Sequence number of the submission whose result is displayed.
    displayed_seq: Option<u64>,
    in_flight: usize,
}

impl std::fmt::Debug for BacktestSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BacktestSession")
            .field("form", &self.form)
            .field("has_result", &self.result.is_some())
            .field("settings", &self.settings)
            .field("backend", &self.backend.name())
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl BacktestSession {
    /// Create a session talking to the HTTP service at `settings.endpoint`.
    pub fn new(settings: Settings) -> Self {
        let backend = Arc::new(HttpBackend::new(settings.endpoint.clone()));
        Self::with_backend(settings, backend)
    }

    /// Create a session on top of any backend implementation.
    pub fn with_backend(settings: Settings, backend: Arc<dyn BacktestBackend>) -> Self {
        Self {
            form: FormState::new(),
            result: None,
            last_error: None,
            settings,
            backend,
            request_service: RequestService::new(),
            chart_service: ChartService::new(),
            next_seq: 0,
            displayed_seq: None,
            in_flight: 0,
        }
    }

    // ── Form Events ─────────────────────────────────────────────────

    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.form.method = method.into();
    }

    pub fn set_years(&mut self, years: impl Into<String>) {
        self.form.years = years.into();
    }

    pub fn set_initial_investment(&mut self, amount: impl Into<String>) {
        self.form.initial_investment = amount.into();
    }

    /// Replace the text of the ticker input box.
    pub fn set_ticker_input(&mut self, text: impl Into<String>) {
        self.form.ticker_input = text.into();
    }

    /// Add the typed ticker to the list (the "Add" button or Enter).
    /// Returns `false` and changes nothing when the input is blank.
    pub fn add_ticker(&mut self) -> bool {
        match self.form.add_ticker().map(str::to_owned) {
            Some(ticker) => {
                tracing::debug!(ticker = %ticker, count = self.form.tickers.len(), "ticker added");
                true
            }
            None => false,
        }
    }

    /// Remove the ticker at a list position. No-op when out of range.
    pub fn remove_ticker(&mut self, index: usize) -> Option<String> {
        let removed = self.form.remove_ticker(index);
        if let Some(ticker) = &removed {
            tracing::debug!(ticker = %ticker, index, "ticker removed");
        }
        removed
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Build the request the current form would submit.
    #[must_use]
    pub fn build_request(&self) -> BacktestRequest {
        self.request_service.build_request(&self.form)
    }

    /// The backend submissions are sent to. Cloned into spawned tasks so
    /// several submissions can be in flight at once.
    #[must_use]
    pub fn backend(&self) -> Arc<dyn BacktestBackend> {
        Arc::clone(&self.backend)
    }

    /// Snapshot the form and mark a submission as in flight.
    ///
    /// Nothing stops a caller from beginning another submission before this
    /// one completes.
    pub fn begin_submission(&mut self) -> Submission {
        self.next_seq += 1;
        self.in_flight += 1;
        let submission = Submission {
            seq: self.next_seq,
            request: self.build_request(),
        };
        tracing::debug!(
            seq = submission.seq,
            in_flight = self.in_flight,
            "backtest submission started"
        );
        submission
    }

    /// Apply the backend's answer to a submission.
    ///
    /// Success replaces the displayed result, subject to the session's
    /// [`ApplyPolicy`]. Failure is written to the log and recorded as the
    /// last error; the displayed result stays exactly as it was.
    pub fn complete_submission(
        &mut self,
        submission: Submission,
        outcome: Result<BacktestResult, CoreError>,
    ) -> Completion {
        self.in_flight = self.in_flight.saturating_sub(1);
        let seq = submission.seq;

        match outcome {
            Ok(result) => {
                let outdated = self.settings.apply_policy == ApplyPolicy::LatestIssued
                    && self.displayed_seq.is_some_and(|shown| seq < shown);
                if outdated {
                    tracing::warn!(
                        seq,
                        displayed = self.displayed_seq,
                        "dropping response to an outdated submission"
                    );
                    return Completion::Stale;
                }
                tracing::info!(
                    seq,
                    final_amount = result.final_amount,
                    periods = result.periodic_returns.len(),
                    "backtest result received"
                );
                self.result = Some(result);
                self.displayed_seq = Some(seq);
                Completion::Applied
            }
            Err(err) => {
                tracing::error!(
                    seq,
                    backend = self.backend.name(),
                    error = %err,
                    "There has been a problem with the backtest request"
                );
                self.last_error = Some(LastError {
                    seq,
                    message: err.to_string(),
                    at: chrono::Utc::now(),
                });
                Completion::Failed
            }
        }
    }

    /// Submit the current form and wait for the answer.
    pub async fn submit(&mut self) -> Completion {
        let submission = self.begin_submission();
        let outcome = self.backend.submit(submission.request()).await;
        self.complete_submission(submission, outcome)
    }

    // ── Page State ──────────────────────────────────────────────────

    #[must_use]
    pub fn phase(&self) -> PagePhase {
        if self.in_flight > 0 {
            PagePhase::Awaiting
        } else if self.result.is_some() {
            PagePhase::Result
        } else {
            PagePhase::Idle
        }
    }

    /// Number of submissions still waiting for an answer.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// The displayed backtest result, if any submission has succeeded.
    #[must_use]
    pub fn result(&self) -> Option<&BacktestResult> {
        self.result.as_ref()
    }

    /// Sequence number of the submission behind the displayed result.
    #[must_use]
    pub fn displayed_seq(&self) -> Option<u64> {
        self.displayed_seq
    }

    /// The most recent failure. Not shown on the page.
    #[must_use]
    pub fn last_error(&self) -> Option<&LastError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Charts ──────────────────────────────────────────────────────

    /// Final portfolio amount rounded for display.
    #[must_use]
    pub fn final_amount(&self) -> Option<f64> {
        self.result
            .as_ref()
            .map(|r| round(r.final_amount, CHART_DECIMALS))
    }

    /// Portfolio return series. Empty before the first result.
    #[must_use]
    pub fn line_chart(&self) -> Vec<ChartPoint> {
        self.result
            .as_ref()
            .map(|r| self.chart_service.to_line_chart_data(&r.periodic_returns))
            .unwrap_or_default()
    }

    /// Per-asset return bars. `None` before the first result or when the
    /// per-asset chart is turned off; empty when the backend sent no breakdown.
    #[must_use]
    pub fn bar_chart(&self) -> Option<Vec<ChartPoint>> {
        if !self.settings.show_per_asset_chart {
            return None;
        }
        let result = self.result.as_ref()?;
        Some(
            result
                .per_asset_returns
                .as_ref()
                .map(|returns| self.chart_service.to_bar_chart_data(returns))
                .unwrap_or_default(),
        )
    }
}
