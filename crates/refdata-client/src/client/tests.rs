//! Unit tests for client module.

use super::*;
use crate::resources::{ClassificationTags, Countries, MarketCalendars};

// ============================================================================
// ClientConfig Tests
// ============================================================================

#[test]
fn test_client_config_default() {
    let config = ClientConfig::default();

    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.timeout, Duration::from_secs(30));
}

// ============================================================================
// RefDataClient Creation Tests
// ============================================================================

#[test]
fn test_client_with_base_url() {
    let client = RefDataClient::with_base_url("http://localhost:3000");

    assert!(client.is_ok());
}

#[test]
fn test_client_rejects_invalid_base_url() {
    let client = RefDataClient::with_base_url("localhost without scheme");

    assert!(matches!(client, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_client_base_url_trimmed() {
    let client = RefDataClient::with_base_url("http://localhost:8080/").unwrap();

    assert_eq!(client.base_url(), "http://localhost:8080");
}

#[test]
fn test_with_token_keeps_original_anonymous() {
    let anonymous = RefDataClient::with_base_url("http://localhost:8080").unwrap();
    let authenticated = anonymous.with_token("abc");

    assert_eq!(anonymous.token(), None);
    assert_eq!(authenticated.token(), Some("abc"));
    assert_eq!(authenticated.base_url(), anonymous.base_url());
}

// ============================================================================
// URL Building Tests
// ============================================================================

#[test]
fn test_resource_urls() {
    let client = RefDataClient::with_base_url("http://api.example.com").unwrap();
    let id = Uuid::nil();

    let countries = client.resource::<Countries>();
    assert_eq!(countries.collection(), "http://api.example.com/api/countries");

    let tags = client.resource::<ClassificationTags>();
    assert_eq!(
        tags.item(id),
        format!("http://api.example.com/api/classification-tags/{}", id)
    );

    let calendars = client.resource::<MarketCalendars>();
    assert_eq!(
        calendars.collection(),
        "http://api.example.com/api/market-calendars"
    );
}

#[test]
fn test_url_with_query() {
    let client = RefDataClient::with_base_url("http://api.example.com").unwrap();

    let url = client
        .url_with_query("/api/sectors", &ListParams::page(3, 10))
        .unwrap();
    assert_eq!(url, "http://api.example.com/api/sectors?page=3&per_page=10");

    let url = client
        .url_with_query("/api/quotes/daily", &DailyQuoteQuery { date: None })
        .unwrap();
    assert_eq!(url, "http://api.example.com/api/quotes/daily");
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    let client = RefDataClient::new(ClientConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let result = client.health_check().await;
    assert!(matches!(result, Err(Error::Http(_))));
}
