//! Reference data CRUD tests.

use refdata_client::resources::{
    ClassificationTags, Countries, Exchanges, Industries, Sectors, StockMarkets,
};
use refdata_client::{
    ClassificationTagRequest, CountryRequest, Error, ExchangeRequest, IndustryRequest,
    ListParams, SectorRequest, StockMarketRequest,
};
use refdata_tests::{master_client, unique_code, unique_name};
use uuid::Uuid;

#[tokio::test]
async fn test_country_crud() {
    let (client, _) = master_client().await;
    let countries = client.resource::<Countries>();
    let name = unique_name("Country");
    let iso = unique_code(2);

    let created = countries
        .create(&CountryRequest::new(&name, &iso))
        .await
        .expect("Failed to create country");
    assert_eq!(created.name, name);
    assert_eq!(created.row_version, 1);

    let fetched = countries.get(created.id).await.expect("Failed to get country");
    assert_eq!(fetched.iso_code, iso);

    let mut replacement = CountryRequest::new(&name, &iso);
    replacement.currency_code = Some("EUR".to_string());
    let updated = countries
        .update(created.id, &replacement)
        .await
        .expect("Failed to update country");
    assert_eq!(updated.currency_code.as_deref(), Some("EUR"));
    assert_eq!(updated.row_version, 2);

    let page = countries
        .list(&ListParams::default().search(&name))
        .await
        .expect("Failed to list countries");
    assert_eq!(page.pagination.total, 1);

    countries.delete(created.id).await.expect("Failed to delete");
    countries
        .delete(created.id)
        .await
        .expect("Repeated delete failed");

    let gone = countries.get(created.id).await;
    assert!(matches!(gone, Err(Error::NotFound(_))));
    let page = countries
        .list(&ListParams::default().search(&name))
        .await
        .expect("Failed to list countries");
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_unknown_ids() {
    let (client, _) = master_client().await;
    let countries = client.resource::<Countries>();

    let result = countries.delete(Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    let result = countries
        .update(Uuid::new_v4(), &CountryRequest::new("Atlantis", "AX"))
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_duplicate_country_is_conflict() {
    let (client, _) = master_client().await;
    let countries = client.resource::<Countries>();
    let iso = unique_code(2);

    countries
        .create(&CountryRequest::new(&unique_name("First"), &iso))
        .await
        .expect("Failed to create country");

    let err = countries
        .create(&CountryRequest::new(&unique_name("Second"), &iso))
        .await
        .expect_err("Duplicate ISO code accepted");
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.code(), Some("DUPLICATE"));
}

#[tokio::test]
async fn test_validation_errors() {
    let (client, _) = master_client().await;

    let err = client
        .resource::<Countries>()
        .create(&CountryRequest::new("Lowercase", "xx"))
        .await
        .expect_err("Invalid ISO code accepted");
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.code(), Some("INVALID_REQUEST"));

    let err = client
        .resource::<ClassificationTags>()
        .create(&ClassificationTagRequest {
            name: unique_name("Tag"),
            category: "Theme".to_string(),
            description: None,
            color: Some("red".to_string()),
        })
        .await
        .expect_err("Invalid color accepted");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_hierarchy_and_parent_filter() {
    let (client, _) = master_client().await;

    let country = client
        .resource::<Countries>()
        .create(&CountryRequest::new(&unique_name("Home"), &unique_code(2)))
        .await
        .expect("Failed to create country");

    let exchanges = client.resource::<Exchanges>();
    let exchange = exchanges
        .create(&ExchangeRequest {
            name: unique_name("Exchange"),
            code: unique_code(4),
            country_id: country.id,
            timezone: "Europe/Stockholm".to_string(),
            website: Some("https://example.com".to_string()),
            is_active: true,
        })
        .await
        .expect("Failed to create exchange");

    let listed = exchanges
        .list(&ListParams::default().parent(country.id))
        .await
        .expect("Failed to list exchanges");
    assert_eq!(listed.pagination.total, 1);
    assert_eq!(listed.items[0].id, exchange.id);

    let market = client
        .resource::<StockMarkets>()
        .create(&StockMarketRequest {
            name: unique_name("Market"),
            code: unique_code(8),
            exchange_id: exchange.id,
            currency_code: "SEK".to_string(),
            is_active: true,
        })
        .await
        .expect("Failed to create stock market");
    assert_eq!(market.exchange_id, exchange.id);

    let sector = client
        .resource::<Sectors>()
        .create(&SectorRequest {
            name: unique_name("Sector"),
            code: None,
            description: None,
        })
        .await
        .expect("Failed to create sector");
    let industry = client
        .resource::<Industries>()
        .create(&IndustryRequest {
            name: unique_name("Industry"),
            code: None,
            sector_id: sector.id,
            description: None,
        })
        .await
        .expect("Failed to create industry");
    assert_eq!(industry.sector_id, sector.id);
}

#[tokio::test]
async fn test_unknown_parent_is_bad_request() {
    let (client, _) = master_client().await;

    let err = client
        .resource::<Industries>()
        .create(&IndustryRequest {
            name: unique_name("Orphan"),
            code: None,
            sector_id: Uuid::new_v4(),
            description: None,
        })
        .await
        .expect_err("Unknown sector accepted");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_pagination() {
    let (client, _) = master_client().await;
    let sectors = client.resource::<Sectors>();
    let prefix = unique_name("Paged");

    for i in 0..5 {
        sectors
            .create(&SectorRequest {
                name: format!("{} {}", prefix, i),
                code: None,
                description: None,
            })
            .await
            .expect("Failed to create sector");
    }

    let first = sectors
        .list(&ListParams::page(1, 2).search(&prefix))
        .await
        .expect("Failed to list sectors");
    assert_eq!(first.pagination.total, 5);
    assert_eq!(first.pagination.pages, 3);
    assert!(first.pagination.has_next);
    assert!(!first.pagination.has_prev);
    assert_eq!(first.items.len(), 2);

    let last = sectors
        .list(&ListParams::page(3, 2).search(&prefix))
        .await
        .expect("Failed to list sectors");
    assert_eq!(last.items.len(), 1);
    assert!(!last.pagination.has_next);

    let err = sectors
        .list(&ListParams::page(1, 1000))
        .await
        .expect_err("Oversized page accepted");
    assert_eq!(err.status(), Some(400));
}
