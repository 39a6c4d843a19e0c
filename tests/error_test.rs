use std::time::Duration;

use eir::{EirError, Result};

#[test]
fn test_error_display() {
    let err = EirError::NotFound("zzzdrug".to_string());
    assert!(err.to_string().contains("zzzdrug"));

    let err = EirError::Unresolved("amlodipinx".to_string());
    assert!(err.to_string().contains("amlodipinx"));

    let err = EirError::Timeout(Duration::from_secs(40));
    assert!(err.to_string().contains("40"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(EirError::NoSource)
    }
    assert!(returns_error().is_err());
}

/// Outcomes are cloned into every batch position that shares a canonical
/// name, so errors must be cloneable without losing their message.
#[test]
fn errors_clone_for_shared_slots() {
    let err = EirError::Api {
        status: 503,
        message: "upstream flapping".to_string(),
    };
    let copy = err.clone();
    assert_eq!(err.to_string(), copy.to_string());
}

// ============================================================================
// Transient error classification
// ============================================================================

#[test]
fn transient_errors() {
    assert!(EirError::RateLimited { retry_after: None }.is_transient());
    assert!(
        EirError::RateLimited {
            retry_after: Some(Duration::from_secs(1))
        }
        .is_transient()
    );
    assert!(EirError::Http("connection reset".into()).is_transient());
    assert!(EirError::Timeout(Duration::from_secs(40)).is_transient());
    assert!(
        EirError::Api {
            status: 500,
            message: "internal".into()
        }
        .is_transient()
    );
    assert!(
        EirError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient()
    );
}

#[test]
fn permanent_errors() {
    assert!(!EirError::NotFound("x".into()).is_transient());
    assert!(!EirError::Unresolved("x".into()).is_transient());
    assert!(!EirError::Json("bad payload".into()).is_transient());
    assert!(!EirError::Persistence("disk full".into()).is_transient());
    assert!(!EirError::NoSource.is_transient());
    assert!(!EirError::Configuration("x".into()).is_transient());
    assert!(
        !EirError::Api {
            status: 400,
            message: "bad request".into()
        }
        .is_transient()
    );
    assert!(
        !EirError::Api {
            status: 404,
            message: "not found".into()
        }
        .is_transient()
    );
}

// ============================================================================
// retry_after extraction
// ============================================================================

#[test]
fn retry_after_from_rate_limited() {
    let duration = Duration::from_secs(5);
    let err = EirError::RateLimited {
        retry_after: Some(duration),
    };
    assert_eq!(err.retry_after(), Some(duration));
}

#[test]
fn retry_after_none_when_not_specified() {
    let err = EirError::RateLimited { retry_after: None };
    assert_eq!(err.retry_after(), None);
}

#[test]
fn retry_after_none_for_non_rate_limit_errors() {
    assert_eq!(EirError::Http("timeout".into()).retry_after(), None);
    assert_eq!(EirError::NoSource.retry_after(), None);
}

/// Serde failures fold into the Json variant so batch outcomes stay
/// cloneable.
#[test]
fn json_errors_convert() {
    let parse_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
    let err: EirError = parse_err.into();
    assert!(matches!(err, EirError::Json(_)));
}
