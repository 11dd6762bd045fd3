//! Application state management.

use crate::auth::{RateLimiter, Role, TokenIssuer, hash_password_blocking};
use crate::config::Config;
use crate::db::{AuditMeta, DatabasePool, Store, User};
use crate::error::ApiError;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

/// Application state shared across all handlers.
pub struct AppState {
    /// Repositories.
    pub store: Store,
    /// Database pool when running on PostgreSQL.
    pub db: Option<DatabasePool>,
    /// Access token issuer.
    pub tokens: TokenIssuer,
    /// Login attempts per client and username.
    pub login_limiter: RateLimiter,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new application state on the in-memory store.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::build(config, Store::in_memory(), None)
    }

    /// Creates a new application state with database.
    #[must_use]
    pub fn with_database(config: Config, db: DatabasePool) -> Self {
        let store = Store::postgres(&db);
        Self::build(config, store, Some(db))
    }

    fn build(config: Config, store: Store, db: Option<DatabasePool>) -> Self {
        Self {
            tokens: TokenIssuer::new(&config.auth),
            login_limiter: RateLimiter::default(),
            store,
            db,
            config,
        }
    }

    /// Seeds the configured Master user when the store holds no users.
    /// Returns the id of the seeded user.
    ///
    /// # Errors
    /// Returns an error if hashing or the insert fails.
    pub async fn bootstrap(&self) -> Result<Option<Uuid>, ApiError> {
        let bootstrap = &self.config.bootstrap;
        if !bootstrap.enabled || self.store.credentials.has_users().await? {
            return Ok(None);
        }

        let password_hash = hash_password_blocking(bootstrap.password.clone()).await?;
        let user = User {
            meta: AuditMeta::new(bootstrap.tenant_id, Uuid::nil(), Utc::now()),
            username: bootstrap.username.clone(),
            email: bootstrap.email.clone(),
            display_name: Some("Bootstrap master".to_string()),
            role: Role::Master,
            password_hash,
            is_active: true,
            last_login_at: None,
        };

        let created = self.store.users.insert(user).await?;
        warn!(
            username = %created.username,
            tenant = %created.meta.tenant_id,
            "Seeded bootstrap master user; change its password"
        );
        Ok(Some(created.meta.id))
    }

    /// Whether the storage backend answers.
    pub async fn storage_reachable(&self) -> bool {
        match &self.db {
            Some(db) => db.ping().await,
            None => true,
        }
    }

    /// Logs the effective setup.
    pub fn log_summary(&self) {
        info!(
            storage = %self.store.backend,
            issuer = %self.config.auth.issuer,
            access_ttl_secs = self.tokens.access_ttl_secs(),
            "Application state ready"
        );
    }
}
