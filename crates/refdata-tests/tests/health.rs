//! Health check and documentation endpoint tests.

use refdata_client::StorageBackend;
use refdata_tests::create_test_client;

#[tokio::test]
async fn test_health_check() {
    let client = create_test_client().await;

    let health = client.health_check().await.expect("Health check failed");

    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
    assert!(health.database_reachable);
    if std::env::var("API_BASE_URL").is_err() {
        assert_eq!(health.storage, StorageBackend::Memory);
    }
}
