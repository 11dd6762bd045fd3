//! Repository abstractions shared by the storage backends.

use super::schema::{AuditMeta, RefreshToken, User};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use sqlx::postgres::PgRow;
use std::fmt::Debug;
use uuid::Uuid;

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// No live row with this id in the tenant.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind.
        kind: &'static str,
        /// Requested id.
        id: Uuid,
    },
    /// A live row already holds the unique key.
    #[error("{0}")]
    Duplicate(String),
    /// The row version no longer matches.
    #[error("{kind} {id} was modified concurrently")]
    Concurrency {
        /// Entity kind.
        kind: &'static str,
        /// Row id.
        id: Uuid,
    },
    /// A foreign key points at a missing row.
    #[error("{0}")]
    InvalidReference(String),
    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A column value bound into generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// TEXT.
    Text(String),
    /// Nullable TEXT.
    OptText(Option<String>),
    /// BOOLEAN.
    Bool(bool),
    /// UUID.
    Uuid(Uuid),
    /// DATE.
    Date(NaiveDate),
    /// Nullable TIME.
    OptTime(Option<NaiveTime>),
    /// Nullable TIMESTAMPTZ.
    OptTimestamp(Option<DateTime<Utc>>),
}

/// A tenant-scoped, soft-deletable, versioned table row.
///
/// The associated constants describe the table to the SQL backend; the
/// methods give the in-memory backend the same view of a row.
pub trait Record:
    Debug + Clone + Send + Sync + Unpin + 'static + for<'r> FromRow<'r, PgRow>
{
    /// Human readable entity name used in messages.
    const KIND: &'static str;
    /// Table name.
    const TABLE: &'static str;
    /// Columns forming the case-insensitive unique key.
    const UNIQUE_COLUMNS: &'static [&'static str];
    /// Whether uniqueness is per tenant or global.
    const TENANT_SCOPED_UNIQUE: bool = true;
    /// Column matched by the `search` list filter.
    const SEARCH_COLUMN: &'static str;
    /// ORDER BY expression for listings.
    const ORDER_BY: &'static str;
    /// Column matched by the `parent_id` list filter.
    const PARENT_COLUMN: Option<&'static str> = None;
    /// Column matched by the `from`/`to` list filters.
    const DATE_COLUMN: Option<&'static str> = None;
    /// Column matched by the `active` list filter.
    const ACTIVE_COLUMN: Option<&'static str> = None;

    /// Audit header.
    fn meta(&self) -> &AuditMeta;

    /// Mutable audit header.
    fn meta_mut(&mut self) -> &mut AuditMeta;

    /// Values of [`Record::UNIQUE_COLUMNS`], in the same order.
    fn unique_key(&self) -> Vec<String>;

    /// Value of [`Record::SEARCH_COLUMN`].
    fn search_text(&self) -> String;

    /// In-memory equivalent of [`Record::ORDER_BY`].
    fn sort_key(&self) -> String;

    /// Data columns written on insert and update, excluding the audit header.
    fn column_values(&self) -> Vec<(&'static str, SqlValue)>;

    /// Columns written on insert but afterwards only through
    /// [`CredentialStore`], never by [`Repository::update`].
    fn credential_values(&self) -> Vec<(&'static str, SqlValue)> {
        Vec::new()
    }

    /// Copies the credential columns of the stored row over `self`.
    fn carry_credentials(&mut self, _stored: &Self) {}

    /// Value of [`Record::PARENT_COLUMN`].
    fn parent_id(&self) -> Option<Uuid> {
        None
    }

    /// Value of [`Record::DATE_COLUMN`].
    fn date(&self) -> Option<NaiveDate> {
        None
    }

    /// Value of [`Record::ACTIVE_COLUMN`].
    fn is_active(&self) -> bool {
        true
    }
}

/// Validated list filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Page number, 1-indexed.
    pub page: i64,
    /// Items per page.
    pub per_page: i64,
    /// Case-insensitive substring of the search column.
    pub search: Option<String>,
    /// Parent row id.
    pub parent_id: Option<Uuid>,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
    /// Active flag.
    pub active: Option<bool>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            search: None,
            parent_id: None,
            from: None,
            to: None,
            active: None,
        }
    }
}

impl ListQuery {
    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.per_page)
    }

    /// Trimmed, non-empty search term.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// In-memory evaluation of the filters against one live row.
    pub fn matches<E: Record>(&self, entity: &E) -> bool {
        if let Some(term) = self.search_term()
            && !entity
                .search_text()
                .to_lowercase()
                .contains(&term.to_lowercase())
        {
            return false;
        }
        if self.parent_id.is_some() && entity.parent_id() != self.parent_id {
            return false;
        }
        if let Some(from) = self.from
            && entity.date().is_none_or(|d| d < from)
        {
            return false;
        }
        if let Some(to) = self.to
            && entity.date().is_none_or(|d| d > to)
        {
            return false;
        }
        if let Some(active) = self.active
            && entity.is_active() != active
        {
            return false;
        }
        true
    }
}

/// One page of rows plus the total number of matches.
#[derive(Debug, Clone)]
pub struct Page<E> {
    /// Rows on this page.
    pub items: Vec<E>,
    /// Matches across all pages.
    pub total: i64,
}

/// CRUD storage for one entity type. Every read ignores soft-deleted rows.
#[async_trait]
pub trait Repository<E: Record>: Send + Sync {
    /// Lists live rows of a tenant.
    async fn list(&self, tenant_id: Uuid, query: &ListQuery) -> Result<Page<E>, RepoError>;

    /// Fetches a live row of a tenant.
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<E>, RepoError>;

    /// Inserts a new row and returns it as stored.
    async fn insert(&self, entity: E) -> Result<E, RepoError>;

    /// Writes the data columns and update audit fields of an existing live row,
    /// incrementing its row version. With `expected_version` the write only
    /// succeeds if the stored version still matches.
    async fn update(&self, entity: E, expected_version: Option<i64>) -> Result<E, RepoError>;

    /// Marks a row deleted. Returns `false` if it already was.
    async fn soft_delete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        actor: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError>;

    /// Whether another live row holds the unique key of `entity`.
    async fn exists_duplicate(&self, entity: &E) -> Result<bool, RepoError>;
}

/// Storage needed by login and token rotation, which act before a tenant is known.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Whether any live user exists.
    async fn has_users(&self) -> Result<bool, RepoError>;

    /// Finds a live user by username, case-insensitively, across tenants.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Finds a live user by id across tenants.
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Stamps the last successful login.
    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Replaces the stored password hash, stamping `actor` as the updater.
    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
        actor: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    /// Persists a refresh token.
    async fn insert_refresh_token(&self, token: RefreshToken) -> Result<(), RepoError>;

    /// Finds a refresh token by the hash of its value.
    async fn find_refresh_token(&self, token_hash: &str)
    -> Result<Option<RefreshToken>, RepoError>;

    /// Revokes a live token. Returns `false` if it was already revoked.
    async fn revoke_refresh_token(
        &self,
        id: Uuid,
        replaced_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError>;

    /// Revokes every live token of a user and returns how many were revoked.
    async fn revoke_user_tokens(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<u64, RepoError>;
}
