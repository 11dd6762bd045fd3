//! The set of repositories the services work against.

use super::memory::{MemoryCredentialStore, MemoryRepository};
use super::pool::DatabasePool;
use super::postgres::{PgCredentialStore, PgRepository};
use super::repository::{CredentialStore, Repository};
use super::schema::{
    ClassificationTag, Country, Exchange, Industry, MarketCalendar, Quote, Sector, StockMarket,
    User,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use utoipa::ToSchema;

/// Which storage implementation backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory, lost on restart.
    Memory,
    /// PostgreSQL.
    Postgres,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Postgres => write!(f, "postgres"),
        }
    }
}

/// One repository per entity plus credential storage.
#[derive(Clone)]
pub struct Store {
    /// Storage implementation in use.
    pub backend: StorageBackend,
    /// Countries.
    pub countries: Arc<dyn Repository<Country>>,
    /// Exchanges.
    pub exchanges: Arc<dyn Repository<Exchange>>,
    /// Sectors.
    pub sectors: Arc<dyn Repository<Sector>>,
    /// Industries.
    pub industries: Arc<dyn Repository<Industry>>,
    /// Classification tags.
    pub classification_tags: Arc<dyn Repository<ClassificationTag>>,
    /// Stock markets.
    pub stock_markets: Arc<dyn Repository<StockMarket>>,
    /// Market calendar days.
    pub market_calendars: Arc<dyn Repository<MarketCalendar>>,
    /// Users.
    pub users: Arc<dyn Repository<User>>,
    /// Motivational quotes.
    pub quotes: Arc<dyn Repository<Quote>>,
    /// Logins and refresh tokens.
    pub credentials: Arc<dyn CredentialStore>,
}

impl Store {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        let users = Arc::new(MemoryRepository::<User>::new());
        Self {
            backend: StorageBackend::Memory,
            countries: Arc::new(MemoryRepository::new()),
            exchanges: Arc::new(MemoryRepository::new()),
            sectors: Arc::new(MemoryRepository::new()),
            industries: Arc::new(MemoryRepository::new()),
            classification_tags: Arc::new(MemoryRepository::new()),
            stock_markets: Arc::new(MemoryRepository::new()),
            market_calendars: Arc::new(MemoryRepository::new()),
            credentials: Arc::new(MemoryCredentialStore::new(Arc::clone(&users))),
            users,
            quotes: Arc::new(MemoryRepository::new()),
        }
    }

    /// Creates a store over PostgreSQL.
    #[must_use]
    pub fn postgres(db: &DatabasePool) -> Self {
        Self {
            backend: StorageBackend::Postgres,
            countries: Arc::new(PgRepository::new(db)),
            exchanges: Arc::new(PgRepository::new(db)),
            sectors: Arc::new(PgRepository::new(db)),
            industries: Arc::new(PgRepository::new(db)),
            classification_tags: Arc::new(PgRepository::new(db)),
            stock_markets: Arc::new(PgRepository::new(db)),
            market_calendars: Arc::new(PgRepository::new(db)),
            users: Arc::new(PgRepository::new(db)),
            quotes: Arc::new(PgRepository::new(db)),
            credentials: Arc::new(PgCredentialStore::new(db)),
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
