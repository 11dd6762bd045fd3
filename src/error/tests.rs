//! Unit tests for error module.

use super::*;
use uuid::Uuid;

// ============================================================================
// ErrorResponse Tests
// ============================================================================

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        error: "Something went wrong".to_string(),
        code: "INTERNAL_ERROR".to_string(),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"error\":\"Something went wrong\""));
    assert!(json.contains("\"code\":\"INTERNAL_ERROR\""));
}

#[test]
fn test_rate_limit_error_response_serialization() {
    let response = RateLimitErrorResponse {
        error: "Rate limit exceeded".to_string(),
        code: "RATE_LIMIT_EXCEEDED".to_string(),
        limit: 10,
        remaining: 0,
        reset: 1704067260,
        retry_after: 60,
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"limit\":10"));
    assert!(json.contains("\"retry_after\":60"));
}

// ============================================================================
// ApiError Display Tests
// ============================================================================

#[test]
fn test_api_error_not_found_display() {
    let error = ApiError::NotFound("Country 42".to_string());
    assert_eq!(format!("{}", error), "Not found: Country 42");
}

#[test]
fn test_api_error_duplicate_display() {
    let error = ApiError::Duplicate("Country DE already exists".to_string());
    assert_eq!(format!("{}", error), "Duplicate: Country DE already exists");
}

#[test]
fn test_api_error_concurrency_display() {
    let error = ApiError::ConcurrencyConflict("stale row version".to_string());
    assert_eq!(
        format!("{}", error),
        "Concurrency conflict: stale row version"
    );
}

// ============================================================================
// ApiError IntoResponse Tests
// ============================================================================

#[test]
fn test_status_mapping() {
    let cases = [
        (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (ApiError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
        (ApiError::Duplicate("x".into()), StatusCode::CONFLICT),
        (ApiError::ConcurrencyConflict("x".into()), StatusCode::CONFLICT),
        (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
        (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
        (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        (ApiError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected) in cases {
        assert_eq!(error.into_response().status(), expected);
    }
}

#[test]
fn test_api_error_rate_limit_exceeded_into_response() {
    let error = ApiError::RateLimitExceeded {
        limit: 10,
        remaining: 0,
        reset: 1704067260,
        retry_after: 60,
    };
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
    assert_eq!(response.headers().get("X-RateLimit-Limit").unwrap(), "10");
}

#[test]
fn test_duplicate_and_concurrency_codes_differ() {
    let (_, duplicate) = ApiError::Duplicate("x".into()).status_and_code();
    let (_, conflict) = ApiError::ConcurrencyConflict("x".into()).status_and_code();
    assert_eq!(duplicate, "DUPLICATE");
    assert_eq!(conflict, "CONCURRENCY_CONFLICT");
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_from_repo_error() {
    let id = Uuid::new_v4();

    let error: ApiError = RepoError::NotFound {
        kind: "Sector",
        id,
    }
    .into();
    assert!(matches!(error, ApiError::NotFound(ref m) if m.contains("Sector")));

    let error: ApiError = RepoError::Concurrency {
        kind: "MarketCalendar",
        id,
    }
    .into();
    assert!(matches!(error, ApiError::ConcurrencyConflict(_)));

    let error: ApiError = RepoError::Duplicate("dup".into()).into();
    assert!(matches!(error, ApiError::Duplicate(_)));

    let error: ApiError = RepoError::InvalidReference("missing parent".into()).into();
    assert!(matches!(error, ApiError::InvalidRequest(_)));
}

#[test]
fn test_from_auth_error() {
    let error: ApiError = AuthError::ExpiredToken.into();
    assert!(matches!(error, ApiError::Unauthorized(_)));

    let error: ApiError = AuthError::PasswordHash("boom".into()).into();
    assert!(matches!(error, ApiError::Internal(_)));
}

#[test]
fn test_from_validation_error() {
    let error: ApiError = ValidationError::Required { field: "name" }.into();
    assert!(matches!(error, ApiError::InvalidRequest(ref m) if m.contains("name")));
}
