use super::*;
use chrono::NaiveTime;

fn country() -> CountryRequest {
    CountryRequest {
        name: "United States".to_string(),
        iso_code: "US".to_string(),
        iso3_code: Some("USA".to_string()),
        currency_code: Some("USD".to_string()),
        is_active: true,
    }
}

fn trading_day() -> MarketCalendarRequest {
    MarketCalendarRequest {
        stock_market_id: Uuid::new_v4(),
        calendar_date: NaiveDate::from_ymd_opt(2025, 11, 28).unwrap(),
        is_trading_day: true,
        is_half_day: true,
        open_time: NaiveTime::from_hms_opt(9, 30, 0),
        close_time: NaiveTime::from_hms_opt(13, 0, 0),
        description: Some("Day after Thanksgiving".to_string()),
    }
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_list_params_defaults() {
    let query = ListParams::default().into_query().unwrap();
    assert_eq!(query.page, 1);
    assert_eq!(query.per_page, DEFAULT_PER_PAGE);
    assert_eq!(query.offset(), 0);
}

#[test]
fn test_list_params_bounds() {
    let bad_page = ListParams {
        page: Some(0),
        ..ListParams::default()
    };
    assert!(bad_page.into_query().is_err());

    let too_many = ListParams {
        per_page: Some(MAX_PER_PAGE + 1),
        ..ListParams::default()
    };
    assert!(too_many.into_query().is_err());

    let ok = ListParams {
        page: Some(3),
        per_page: Some(MAX_PER_PAGE),
        ..ListParams::default()
    };
    assert_eq!(ok.into_query().unwrap().offset(), 200);

    let huge = ListParams {
        page: Some(i64::MAX),
        ..ListParams::default()
    };
    assert!(matches!(
        huge.into_query(),
        Err(ValidationError::Format { field: "page", .. })
    ));
}

#[test]
fn test_offset_saturates() {
    let query = ListQuery {
        page: i64::MAX,
        per_page: MAX_PER_PAGE,
        ..ListQuery::default()
    };
    assert_eq!(query.offset(), i64::MAX);
}

#[test]
fn test_list_params_date_range() {
    let params = ListParams {
        from: NaiveDate::from_ymd_opt(2025, 12, 31),
        to: NaiveDate::from_ymd_opt(2025, 1, 1),
        ..ListParams::default()
    };
    assert!(matches!(params.into_query(), Err(ValidationError::Rule(_))));
}

#[test]
fn test_list_params_from_query_string() {
    let params: ListParams =
        serde_urlencoded::from_str("page=2&per_page=5&search=nyse&active=true").unwrap();
    assert_eq!(params.page, Some(2));
    assert_eq!(params.per_page, Some(5));
    assert_eq!(params.search.as_deref(), Some("nyse"));
    assert_eq!(params.active, Some(true));
}

#[test]
fn test_pagination_metadata() {
    let meta = PaginationMetadata::new(2, 20, 45);
    assert_eq!(meta.pages, 3);
    assert!(meta.has_next);
    assert!(meta.has_prev);

    let empty = PaginationMetadata::new(1, 20, 0);
    assert_eq!(empty.pages, 0);
    assert!(!empty.has_next);
    assert!(!empty.has_prev);

    let exact = PaginationMetadata::new(2, 10, 20);
    assert_eq!(exact.pages, 2);
    assert!(!exact.has_next);
}

// ============================================================================
// Reference Data
// ============================================================================

#[test]
fn test_country_validation() {
    assert!(country().validate().is_ok());

    let mut lower = country();
    lower.iso_code = "us".to_string();
    assert!(matches!(
        lower.validate(),
        Err(ValidationError::Format {
            field: "iso_code",
            ..
        })
    ));

    let mut blank = country();
    blank.name = "   ".to_string();
    assert_eq!(
        blank.validate(),
        Err(ValidationError::Required { field: "name" })
    );

    let mut bad_currency = country();
    bad_currency.currency_code = Some("DOLLAR".to_string());
    assert!(bad_currency.validate().is_err());
}

#[test]
fn test_country_request_defaults_active() {
    let request: CountryRequest =
        serde_json::from_str(r#"{"name": "Japan", "iso_code": "JP"}"#).unwrap();
    assert!(request.is_active);
    assert!(request.iso3_code.is_none());
}

#[test]
fn test_exchange_validation() {
    let mut exchange = ExchangeRequest {
        name: "New York Stock Exchange".to_string(),
        code: "XNYS".to_string(),
        country_id: Uuid::new_v4(),
        timezone: "America/New_York".to_string(),
        website: Some("https://www.nyse.com".to_string()),
        is_active: true,
    };
    assert!(exchange.validate().is_ok());

    exchange.code = "NYSE1".to_string();
    assert!(exchange.validate().is_err());

    exchange.code = "XNYS".to_string();
    exchange.website = Some("ftp://nyse.com".to_string());
    assert!(exchange.validate().is_err());
}

#[test]
fn test_classification_tag_color() {
    let mut tag = ClassificationTagRequest {
        name: "Dividend".to_string(),
        category: "theme".to_string(),
        description: None,
        color: Some("#1A2b3C".to_string()),
    };
    assert!(tag.validate().is_ok());

    tag.color = Some("red".to_string());
    assert!(tag.validate().is_err());
}

#[test]
fn test_validation_error_messages_name_the_field() {
    let err = ValidationError::TooLong {
        field: "description",
        max: 10,
    };
    assert_eq!(err.to_string(), "description must be at most 10 characters");
}

// ============================================================================
// Market Calendars
// ============================================================================

#[test]
fn test_calendar_trading_day_requires_ordered_times() {
    assert!(trading_day().validate().is_ok());

    let mut missing = trading_day();
    missing.close_time = None;
    assert!(missing.validate().is_err());

    let mut reversed = trading_day();
    reversed.open_time = NaiveTime::from_hms_opt(16, 0, 0);
    assert!(reversed.validate().is_err());
}

#[test]
fn test_calendar_holiday_rejects_times() {
    let mut holiday = trading_day();
    holiday.is_trading_day = false;
    assert!(holiday.validate().is_err());

    holiday.open_time = None;
    holiday.close_time = None;
    assert!(holiday.validate().is_err(), "half day on a holiday");

    holiday.is_half_day = false;
    assert!(holiday.validate().is_ok());
}

#[test]
fn test_calendar_update_request_flattens_day() {
    let json = r#"{
        "stock_market_id": "6f1d4b5e-8a43-4c0e-9d7b-2f7a1c3e9b10",
        "calendar_date": "2025-12-25",
        "is_trading_day": false,
        "description": "Christmas",
        "row_version": 4
    }"#;
    let request: MarketCalendarUpdateRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.row_version, 4);
    assert!(!request.day.is_trading_day);
    assert!(request.validate().is_ok());

    let stale = MarketCalendarUpdateRequest {
        row_version: 0,
        ..request
    };
    assert!(stale.validate().is_err());
}

// ============================================================================
// Users and Sessions
// ============================================================================

#[test]
fn test_create_user_validation() {
    let mut request = CreateUserRequest {
        username: "jane.doe".to_string(),
        email: "jane@example.com".to_string(),
        display_name: Some("Jane".to_string()),
        role: crate::auth::Role::Trader,
        password: "sufficiently-long".to_string(),
        is_active: true,
    };
    assert!(request.validate().is_ok());

    request.username = "jd".to_string();
    assert!(request.validate().is_err());

    request.username = "jane doe".to_string();
    assert!(request.validate().is_err());

    request.username = "jane.doe".to_string();
    request.email = "not-an-email".to_string();
    assert!(request.validate().is_err());

    request.email = "jane@example.com".to_string();
    request.password = "short".to_string();
    assert!(request.validate().is_err());
}

#[test]
fn test_change_password_validation() {
    let same = ChangePasswordRequest {
        current_password: "old-password".to_string(),
        new_password: "old-password".to_string(),
    };
    assert!(matches!(same.validate(), Err(ValidationError::Rule(_))));

    let ok = ChangePasswordRequest {
        current_password: "old-password".to_string(),
        new_password: "new-password".to_string(),
    };
    assert!(ok.validate().is_ok());
}

#[test]
fn test_login_request_debug_hides_password() {
    let request = LoginRequest {
        username: "ops".to_string(),
        password: "hunter22-secret".to_string(),
    };
    let rendered = format!("{request:?}");
    assert!(rendered.contains("ops"));
    assert!(!rendered.contains("hunter22"));
}
