// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use backtest_client_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("bad float".into());
        assert_eq!(err.to_string(), "Serialization error: bad float");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("missing field".into());
        assert_eq!(err.to_string(), "Deserialization error: missing field");
    }

    #[test]
    fn api_includes_provider_and_status() {
        let err = CoreError::Api {
            provider: "BacktestService".into(),
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error (BacktestService): HTTP 500: Internal Server Error"
        );
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn task_failed() {
        let err = CoreError::TaskFailed("task 2 panicked".into());
        assert_eq!(err.to_string(), "Submission task failed: task 2 panicked");
        assert_eq!(err.status(), None);
    }
}

// ── Accessors ───────────────────────────────────────────────────────

mod status {
    use super::*;

    #[test]
    fn api_error_exposes_status() {
        let err = CoreError::Api {
            provider: "x".into(),
            status: 422,
            message: "bad years".into(),
        };
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn transport_errors_have_no_status() {
        assert_eq!(CoreError::Network("down".into()).status(), None);
        assert_eq!(CoreError::Deserialization("eof".into()).status(), None);
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn serde_json_error_becomes_deserialization() {
        let json_err = serde_json::from_str::<Vec<f64>>("[1, 2").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<CoreError>();
    }
}
