//! Unit tests for error module.

use super::*;

#[test]
fn test_api_error_display() {
    let error = Error::Api {
        status: 409,
        code: "DUPLICATE".to_string(),
        message: "Country with iso_code 'US' already exists".to_string(),
    };

    let display = format!("{}", error);
    assert!(display.contains("409"));
    assert!(display.contains("DUPLICATE"));
    assert!(display.contains("iso_code"));
}

#[test]
fn test_not_found_error_display() {
    let error = Error::NotFound("Country 42".to_string());

    let display = format!("{}", error);
    assert!(display.contains("Not found"));
    assert!(display.contains("Country 42"));
}

#[test]
fn test_status_and_code() {
    let conflict = Error::Api {
        status: 409,
        code: "CONCURRENCY_CONFLICT".to_string(),
        message: "stale row version".to_string(),
    };
    assert_eq!(conflict.status(), Some(409));
    assert_eq!(conflict.code(), Some("CONCURRENCY_CONFLICT"));

    let missing = Error::NotFound(String::new());
    assert_eq!(missing.status(), Some(404));
    assert_eq!(missing.code(), Some("NOT_FOUND"));

    let unauthorized = Error::Unauthorized("token expired".to_string());
    assert_eq!(unauthorized.status(), Some(401));
}

#[test]
fn test_invalid_url_conversion() {
    let error: Error = url::Url::parse("not a url").unwrap_err().into();
    assert!(matches!(error, Error::InvalidUrl(_)));
    assert_eq!(error.status(), None);
}
