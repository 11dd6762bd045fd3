//! Quote tests.

use chrono::NaiveDate;
use refdata_client::resources::Quotes;
use refdata_client::{Error, ListParams, QuoteRequest};
use refdata_tests::{master_client, unique_name};

#[tokio::test]
async fn test_random_and_daily_quotes() {
    let (client, _) = master_client().await;
    let quotes = client.resource::<Quotes>();

    for i in 0..3 {
        quotes
            .create(&QuoteRequest {
                text: unique_name(&format!("Stay disciplined {}", i)),
                author: Some("Anonymous".to_string()),
                category: Some("discipline".to_string()),
                is_active: true,
            })
            .await
            .expect("Failed to create quote");
    }
    let retired = quotes
        .create(&QuoteRequest {
            text: unique_name("Retired"),
            author: None,
            category: None,
            is_active: false,
        })
        .await
        .expect("Failed to create quote");

    for _ in 0..10 {
        let quote = client.random_quote().await.expect("Failed to get random quote");
        assert!(quote.is_active);
        assert_ne!(quote.id, retired.id);
    }

    let date = NaiveDate::from_ymd_opt(2026, 10, 19);
    let first = client.daily_quote(date).await.expect("Failed to get daily quote");
    let second = client.daily_quote(date).await.expect("Failed to get daily quote");
    assert_eq!(first.id, second.id);

    client
        .daily_quote(None)
        .await
        .expect("Failed to get today's quote");

    let inactive = quotes
        .list(&ListParams {
            active: Some(false),
            ..ListParams::default()
        })
        .await
        .expect("Failed to list quotes");
    assert!(inactive.items.iter().any(|q| q.id == retired.id));
}

#[tokio::test]
async fn test_no_quotes_is_not_found() {
    if std::env::var("API_BASE_URL").is_ok() {
        // A shared server may already hold quotes.
        return;
    }
    let (client, _) = master_client().await;

    let result = client.random_quote().await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}
