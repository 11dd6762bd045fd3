//! Integration tests for the Reference Data Admin API.
//!
//! Tests run against the server at `API_BASE_URL` when that variable is
//! set. Otherwise every test starts its own server on an ephemeral port,
//! backed by the in-memory store with the default bootstrap master user.

use refdata_admin_backend::api::create_router;
use refdata_admin_backend::config::Config;
use refdata_admin_backend::state::AppState;
use refdata_client::{ClientConfig, RefDataClient, TokenResponse};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Credentials of the bootstrap master user.
pub const MASTER_USERNAME: &str = "master";
/// Password of the bootstrap master user.
pub const MASTER_PASSWORD: &str = "ChangeMe123!";

/// Starts a server on `127.0.0.1:0` and returns its base URL. The server
/// lives as long as the current runtime.
///
/// # Panics
/// Panics if the listener cannot be bound or bootstrapping fails.
pub async fn spawn_server() -> String {
    let state = Arc::new(AppState::new(Config::default()));
    state
        .bootstrap()
        .await
        .expect("Failed to bootstrap master user");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    let app = create_router(state);
    tokio::spawn(async move {
        let _ = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await;
    });

    format!("http://{}", addr)
}

/// Base URL of the server under test.
pub async fn api_url() -> String {
    match std::env::var("API_BASE_URL") {
        Ok(url) => url,
        Err(_) => spawn_server().await,
    }
}

/// Creates an anonymous test client.
///
/// # Panics
/// Panics if client creation fails.
pub async fn create_test_client() -> RefDataClient {
    RefDataClient::new(ClientConfig {
        base_url: api_url().await,
        timeout: Duration::from_secs(10),
    })
    .expect("Failed to create client")
}

/// Creates a client logged in as the bootstrap master user, along with the
/// login response.
///
/// # Panics
/// Panics if login fails.
pub async fn master_client() -> (RefDataClient, TokenResponse) {
    let client = create_test_client().await;
    let session = client
        .login(MASTER_USERNAME, MASTER_PASSWORD)
        .await
        .expect("Master login failed");
    (client.with_token(&session.access_token), session)
}

/// Generates a unique name to avoid conflicts between tests sharing a server.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{}_{}_{}", prefix, ts, counter)
}

/// Uppercase letters derived from a counter, for fixed-length codes such as
/// ISO country codes that must differ between tests.
#[must_use]
pub fn unique_code(len: usize) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let mut n = seed.wrapping_add(COUNTER.fetch_add(7919, Ordering::Relaxed));
    (0..len)
        .map(|_| {
            let c = char::from(b'A' + (n % 26) as u8);
            n /= 26;
            c
        })
        .collect()
}
