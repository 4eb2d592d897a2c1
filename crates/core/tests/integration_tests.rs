// ═══════════════════════════════════════════════════════════════════
// Session Tests — BacktestSession facade: form events, submissions,
// failure handling, overlapping completions, chart output
// ═══════════════════════════════════════════════════════════════════

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backtest_client_core::backend::traits::BacktestBackend;
use backtest_client_core::errors::CoreError;
use backtest_client_core::models::chart::ChartPoint;
use backtest_client_core::models::page::{Completion, PagePhase};
use backtest_client_core::models::request::BacktestRequest;
use backtest_client_core::models::result::{BacktestResult, PerAssetReturns};
use backtest_client_core::models::settings::{ApplyPolicy, Settings};
use backtest_client_core::BacktestSession;

// ═══════════════════════════════════════════════════════════════════
// Mock Backends
// ═══════════════════════════════════════════════════════════════════

/// Replays a fixed sequence of outcomes and records every request it sees.
struct ScriptedBackend {
    outcomes: Mutex<Vec<Result<BacktestResult, CoreError>>>,
    seen: Mutex<Vec<BacktestRequest>>,
}

impl ScriptedBackend {
    fn new(mut outcomes: Vec<Result<BacktestResult, CoreError>>) -> Self {
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<BacktestRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl BacktestBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn submit(&self, request: &BacktestRequest) -> Result<BacktestResult, CoreError> {
        self.seen.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(CoreError::Network("script exhausted".into())))
    }
}

fn result(final_amount: f64, returns: &[f64], per_asset: &[(&str, f64)]) -> BacktestResult {
    BacktestResult {
        final_amount,
        periodic_returns: returns.to_vec(),
        per_asset_returns: Some(per_asset.iter().copied().collect::<PerAssetReturns>()),
    }
}

fn http_500() -> CoreError {
    CoreError::Api {
        provider: "Scripted".into(),
        status: 500,
        message: "Internal Server Error".into(),
    }
}

fn session_with(
    settings: Settings,
    outcomes: Vec<Result<BacktestResult, CoreError>>,
) -> (BacktestSession, Arc<ScriptedBackend>) {
    let backend = Arc::new(ScriptedBackend::new(outcomes));
    let session = BacktestSession::with_backend(settings, backend.clone());
    (session, backend)
}

fn fill_sample_form(session: &mut BacktestSession) {
    session.set_method("sharpe");
    session.set_years("5");
    session.set_initial_investment("1000");
    for t in ["PETR4", "VALE3"] {
        session.set_ticker_input(t);
        assert!(session.add_ticker());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Form events
// ═══════════════════════════════════════════════════════════════════

mod form_events {
    use super::*;

    #[test]
    fn new_session_is_idle_with_empty_form() {
        let (session, _) = session_with(Settings::default(), vec![]);
        assert_eq!(session.phase(), PagePhase::Idle);
        assert!(session.form().tickers.is_empty());
        assert!(session.result().is_none());
        assert!(session.last_error().is_none());
        assert_eq!(session.final_amount(), None);
        assert!(session.line_chart().is_empty());
        assert_eq!(session.bar_chart(), None);
    }

    #[test]
    fn blank_ticker_changes_nothing() {
        let (mut session, _) = session_with(Settings::default(), vec![]);
        fill_sample_form(&mut session);
        session.set_ticker_input("   ");
        let before = session.form().clone();

        assert!(!session.add_ticker());
        assert_eq!(session.form(), &before);
    }

    #[test]
    fn remove_by_index() {
        let (mut session, _) = session_with(Settings::default(), vec![]);
        for t in ["A", "B", "C"] {
            session.set_ticker_input(t);
            session.add_ticker();
        }
        assert_eq!(session.remove_ticker(1).as_deref(), Some("B"));
        assert_eq!(session.remove_ticker(7), None);
        assert_eq!(session.build_request().tickers, vec!["A", "C"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Submission
// ═══════════════════════════════════════════════════════════════════

mod submission {
    use super::*;

    #[tokio::test]
    async fn end_to_end_scenario() {
        let (mut session, backend) = session_with(
            Settings::default(),
            vec![Ok(result(
                2345.678,
                &[1.0, 1.05, 1.1],
                &[("PETR4", 10.5), ("VALE3", -2.3)],
            ))],
        );
        fill_sample_form(&mut session);

        assert_eq!(session.submit().await, Completion::Applied);

        let sent = backend.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "sharpe");
        assert_eq!(sent[0].years, Some(5));
        assert_eq!(sent[0].initial_investment, Some(1000.0));
        assert_eq!(sent[0].tickers, vec!["PETR4", "VALE3"]);

        assert_eq!(session.phase(), PagePhase::Result);
        assert_eq!(session.final_amount(), Some(2345.68));
        assert_eq!(
            session.line_chart(),
            vec![
                ChartPoint::index(1, 1.0),
                ChartPoint::index(2, 1.05),
                ChartPoint::index(3, 1.1),
            ]
        );
        assert_eq!(
            session.bar_chart(),
            Some(vec![ChartPoint::key("PETR4", 10.5), ChartPoint::key("VALE3", -2.3)])
        );
    }

    #[tokio::test]
    async fn form_is_kept_after_submit() {
        let (mut session, _) =
            session_with(Settings::default(), vec![Ok(result(1.0, &[1.0], &[]))]);
        fill_sample_form(&mut session);
        let before = session.form().clone();
        session.submit().await;
        assert_eq!(session.form(), &before);
    }

    #[tokio::test]
    async fn new_result_replaces_previous() {
        let (mut session, _) = session_with(
            Settings::default(),
            vec![
                Ok(result(100.0, &[1.0], &[("A", 1.0)])),
                Ok(result(200.0, &[2.0, 3.0], &[])),
            ],
        );
        session.submit().await;
        session.submit().await;
        assert_eq!(session.final_amount(), Some(200.0));
        assert_eq!(session.line_chart().len(), 2);
        assert_eq!(session.bar_chart(), Some(vec![]));
        assert_eq!(session.displayed_seq(), Some(2));
    }

    #[test]
    fn request_is_snapshotted_at_begin() {
        let (mut session, _) = session_with(Settings::default(), vec![]);
        fill_sample_form(&mut session);
        let submission = session.begin_submission();
        session.set_method("markowitz");
        session.remove_ticker(0);

        assert_eq!(submission.request().method, "sharpe");
        assert_eq!(submission.request().tickers, vec!["PETR4", "VALE3"]);
        assert_eq!(session.phase(), PagePhase::Awaiting);
    }

    #[test]
    fn sequence_numbers_increase() {
        let (mut session, _) = session_with(Settings::default(), vec![]);
        let a = session.begin_submission();
        let b = session.begin_submission();
        assert!(b.seq() > a.seq());
        assert_eq!(session.in_flight(), 2);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Failure handling
// ═══════════════════════════════════════════════════════════════════

mod failures {
    use super::*;

    #[tokio::test]
    async fn failure_before_any_result_stays_idle() {
        let (mut session, _) = session_with(Settings::default(), vec![Err(http_500())]);
        assert_eq!(session.submit().await, Completion::Failed);
        assert_eq!(session.phase(), PagePhase::Idle);
        assert!(session.result().is_none());
        assert!(session.line_chart().is_empty());
    }

    #[tokio::test]
    async fn http_500_leaves_displayed_result_identical() {
        let (mut session, _) = session_with(
            Settings::default(),
            vec![
                Ok(result(2345.678, &[1.0, 1.05], &[("PETR4", 10.5)])),
                Err(http_500()),
            ],
        );
        session.submit().await;
        let shown = serde_json::to_vec(session.result().unwrap()).unwrap();
        let line = session.line_chart();
        let bar = session.bar_chart();

        session.set_years("10");
        assert_eq!(session.submit().await, Completion::Failed);

        assert_eq!(serde_json::to_vec(session.result().unwrap()).unwrap(), shown);
        assert_eq!(session.line_chart(), line);
        assert_eq!(session.bar_chart(), bar);
        assert_eq!(session.phase(), PagePhase::Result);
        assert_eq!(session.displayed_seq(), Some(1));
    }

    #[tokio::test]
    async fn failure_is_recorded_as_last_error() {
        let (mut session, _) = session_with(
            Settings::default(),
            vec![Err(CoreError::Network("connection refused".into()))],
        );
        session.submit().await;
        let err = session.last_error().unwrap();
        assert_eq!(err.seq, 1);
        assert_eq!(err.message, "Network error: connection refused");
    }

    #[tokio::test]
    async fn later_success_keeps_last_error_for_diagnostics() {
        let (mut session, _) = session_with(
            Settings::default(),
            vec![Err(http_500()), Ok(result(1.0, &[], &[]))],
        );
        session.submit().await;
        session.submit().await;
        assert_eq!(session.phase(), PagePhase::Result);
        assert_eq!(session.last_error().map(|e| e.seq), Some(1));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Overlapping submissions
// ═══════════════════════════════════════════════════════════════════

mod overlapping {
    use super::*;

    fn settings(policy: ApplyPolicy) -> Settings {
        Settings {
            apply_policy: policy,
            ..Settings::default()
        }
    }

    #[test]
    fn last_completed_wins_by_default() {
        let (mut session, _) = session_with(Settings::default(), vec![]);
        let first = session.begin_submission();
        let second = session.begin_submission();

        // The newer request answers first, the older one last.
        let done = session.complete_submission(second, Ok(result(2.0, &[], &[])));
        assert_eq!(done, Completion::Applied);
        assert_eq!(session.phase(), PagePhase::Awaiting);

        let done = session.complete_submission(first, Ok(result(1.0, &[], &[])));
        assert_eq!(done, Completion::Applied);
        assert_eq!(session.final_amount(), Some(1.0));
        assert_eq!(session.displayed_seq(), Some(1));
        assert_eq!(session.phase(), PagePhase::Result);
    }

    #[test]
    fn latest_issued_drops_outdated_answers() {
        let (mut session, _) = session_with(settings(ApplyPolicy::LatestIssued), vec![]);
        let first = session.begin_submission();
        let second = session.begin_submission();

        session.complete_submission(second, Ok(result(2.0, &[], &[])));
        let done = session.complete_submission(first, Ok(result(1.0, &[], &[])));

        assert_eq!(done, Completion::Stale);
        assert_eq!(session.final_amount(), Some(2.0));
        assert_eq!(session.displayed_seq(), Some(2));
        assert_eq!(session.in_flight(), 0);
    }

    #[test]
    fn latest_issued_applies_in_order_answers() {
        let (mut session, _) = session_with(settings(ApplyPolicy::LatestIssued), vec![]);
        let first = session.begin_submission();
        let second = session.begin_submission();

        assert_eq!(
            session.complete_submission(first, Ok(result(1.0, &[], &[]))),
            Completion::Applied
        );
        assert_eq!(
            session.complete_submission(second, Ok(result(2.0, &[], &[]))),
            Completion::Applied
        );
        assert_eq!(session.final_amount(), Some(2.0));
    }

    #[tokio::test]
    async fn concurrent_tasks_share_the_backend() {
        let (mut session, backend) = session_with(
            Settings::default(),
            vec![Ok(result(1.0, &[], &[])), Ok(result(2.0, &[], &[]))],
        );
        let a = session.begin_submission();
        let b = session.begin_submission();

        let (ba, bb) = (session.backend(), session.backend());
        let ta = tokio::spawn(async move {
            let outcome = ba.submit(a.request()).await;
            (a, outcome)
        });
        let tb = tokio::spawn(async move {
            let outcome = bb.submit(b.request()).await;
            (b, outcome)
        });

        for task in [ta, tb] {
            let (submission, outcome) = task.await.unwrap();
            assert_eq!(session.complete_submission(submission, outcome), Completion::Applied);
        }
        assert_eq!(backend.requests().len(), 2);
        assert_eq!(session.in_flight(), 0);
        assert!(session.result().is_some());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings — per-asset chart toggle
// ═══════════════════════════════════════════════════════════════════

mod per_asset_chart {
    use super::*;

    #[tokio::test]
    async fn disabled_chart_is_never_produced() {
        let settings = Settings {
            show_per_asset_chart: false,
            ..Settings::default()
        };
        let (mut session, _) =
            session_with(settings, vec![Ok(result(1.0, &[1.0], &[("A", 1.0)]))]);
        session.submit().await;
        assert_eq!(session.bar_chart(), None);
        assert_eq!(session.line_chart().len(), 1);
    }

    #[tokio::test]
    async fn missing_breakdown_gives_empty_chart() {
        let (mut session, _) = session_with(
            Settings::default(),
            vec![Ok(BacktestResult {
                final_amount: 1.0,
                periodic_returns: vec![],
                per_asset_returns: None,
            })],
        );
        session.submit().await;
        assert_eq!(session.bar_chart(), Some(vec![]));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Over HTTP
// ═══════════════════════════════════════════════════════════════════

mod over_http {
    use super::*;

    #[tokio::test]
    async fn session_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/start_test/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"montante_final": 2345.678, "portifolio_returns": [1, 1.05, 1.1],
                    "return_per_stock": {"PETR4": 10.5, "VALE3": -2.3}}"#,
            )
            .create_async()
            .await;

        let settings = Settings {
            endpoint: format!("{}/start_test/", server.url()),
            ..Settings::default()
        };
        let mut session = BacktestSession::new(settings);
        fill_sample_form(&mut session);

        assert_eq!(session.submit().await, Completion::Applied);
        assert_eq!(session.final_amount(), Some(2345.68));
        assert_eq!(
            session.bar_chart(),
            Some(vec![ChartPoint::key("PETR4", 10.5), ChartPoint::key("VALE3", -2.3)])
        );
    }

    #[tokio::test]
    async fn server_error_is_silent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/start_test/")
            .with_status(500)
            .create_async()
            .await;

        let settings = Settings {
            endpoint: format!("{}/start_test/", server.url()),
            ..Settings::default()
        };
        let mut session = BacktestSession::new(settings);
        assert_eq!(session.submit().await, Completion::Failed);
        assert_eq!(session.phase(), PagePhase::Idle);
        assert!(session.last_error().unwrap().message.contains("500"));
    }
}
