//! Persistence: entity records, repository traits and their PostgreSQL and
//! in-memory implementations.

mod memory;
mod pool;
mod postgres;
mod repository;
mod schema;
mod store;

pub use memory::{MemoryCredentialStore, MemoryRepository};
pub use pool::DatabasePool;
pub use postgres::{PgCredentialStore, PgRepository};
pub use repository::{CredentialStore, ListQuery, Page, Record, RepoError, Repository, SqlValue};
pub use schema::*;
pub use store::{StorageBackend, Store};
