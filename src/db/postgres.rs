//! PostgreSQL storage built on generated SQL.

use super::pool::DatabasePool;
use super::repository::{
    CredentialStore, ListQuery, Page, Record, RepoError, Repository, SqlValue,
};
use super::schema::{RefreshToken, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::marker::PhantomData;
use tracing::debug;
use uuid::Uuid;

/// Audit header columns, in insert order.
const AUDIT_COLUMNS: &str = "id, tenant_id, created_at, created_by, is_deleted, row_version";

/// Escapes LIKE wildcards so user input matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: SqlValue) {
    match value {
        SqlValue::Text(v) => {
            builder.push_bind(v);
        }
        SqlValue::OptText(v) => {
            builder.push_bind(v);
        }
        SqlValue::Bool(v) => {
            builder.push_bind(v);
        }
        SqlValue::Uuid(v) => {
            builder.push_bind(v);
        }
        SqlValue::Date(v) => {
            builder.push_bind(v);
        }
        SqlValue::OptTime(v) => {
            builder.push_bind(v);
        }
        SqlValue::OptTimestamp(v) => {
            builder.push_bind(v);
        }
    }
}

/// Maps constraint violations onto repository errors.
fn map_db_error<E: Record>(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepoError::Duplicate(format!("{} already exists", E::KIND));
        }
        if db_err.is_foreign_key_violation() {
            return RepoError::InvalidReference(format!(
                "{} references a record that does not exist",
                E::KIND
            ));
        }
    }
    RepoError::Database(err)
}

fn push_filters<E: Record>(
    builder: &mut QueryBuilder<'_, Postgres>,
    tenant_id: Uuid,
    query: &ListQuery,
) {
    builder
        .push(" WHERE tenant_id = ")
        .push_bind(tenant_id)
        .push(" AND is_deleted = FALSE");

    if let Some(term) = query.search_term() {
        builder
            .push(format!(" AND {} ILIKE ", E::SEARCH_COLUMN))
            .push_bind(format!("%{}%", escape_like(term)));
    }
    if let (Some(column), Some(parent_id)) = (E::PARENT_COLUMN, query.parent_id) {
        builder
            .push(format!(" AND {} = ", column))
            .push_bind(parent_id);
    }
    if let Some(column) = E::DATE_COLUMN {
        if let Some(from) = query.from {
            builder.push(format!(" AND {} >= ", column)).push_bind(from);
        }
        if let Some(to) = query.to {
            builder.push(format!(" AND {} <= ", column)).push_bind(to);
        }
    }
    if let (Some(column), Some(active)) = (E::ACTIVE_COLUMN, query.active) {
        builder.push(format!(" AND {} = ", column)).push_bind(active);
    }
}

pub(crate) fn insert_statement<E: Record>(entity: &E) -> QueryBuilder<'static, Postgres> {
    let meta = entity.meta();
    let mut values = entity.column_values();
    values.extend(entity.credential_values());

    let mut builder = QueryBuilder::new(format!("INSERT INTO {} ({}", E::TABLE, AUDIT_COLUMNS));
    for (column, _) in &values {
        builder.push(", ").push(*column);
    }
    builder.push(") VALUES (");
    builder
        .push_bind(meta.id)
        .push(", ")
        .push_bind(meta.tenant_id)
        .push(", ")
        .push_bind(meta.created_at)
        .push(", ")
        .push_bind(meta.created_by)
        .push(", FALSE, 1");
    for (_, value) in values {
        builder.push(", ");
        push_value(&mut builder, value);
    }
    builder.push(") RETURNING *");
    builder
}

pub(crate) fn update_statement<E: Record>(
    entity: &E,
    expected_version: Option<i64>,
) -> QueryBuilder<'static, Postgres> {
    let meta = entity.meta();

    let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
    for (column, value) in entity.column_values() {
        builder.push(column).push(" = ");
        push_value(&mut builder, value);
        builder.push(", ");
    }
    builder
        .push("updated_at = ")
        .push_bind(meta.updated_at)
        .push(", updated_by = ")
        .push_bind(meta.updated_by)
        .push(", row_version = row_version + 1 WHERE id = ")
        .push_bind(meta.id)
        .push(" AND tenant_id = ")
        .push_bind(meta.tenant_id)
        .push(" AND is_deleted = FALSE");
    if let Some(version) = expected_version {
        builder.push(" AND row_version = ").push_bind(version);
    }
    builder.push(" RETURNING *");
    builder
}

pub(crate) fn duplicate_statement<E: Record>(entity: &E) -> QueryBuilder<'static, Postgres> {
    let meta = entity.meta();

    let mut builder = QueryBuilder::new(format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE is_deleted = FALSE AND id <> ",
        E::TABLE
    ));
    builder.push_bind(meta.id);
    if E::TENANT_SCOPED_UNIQUE {
        builder.push(" AND tenant_id = ").push_bind(meta.tenant_id);
    }
    for (column, value) in E::UNIQUE_COLUMNS.iter().zip(entity.unique_key()) {
        builder
            .push(format!(" AND lower({}::text) = lower(", column))
            .push_bind(value)
            .push(")");
    }
    builder.push(")");
    builder
}

/// Repository for one entity table.
pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Record> PgRepository<E> {
    /// Creates a repository over the shared pool.
    #[must_use]
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
            _entity: PhantomData,
        }
    }

    async fn exists_any(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, RepoError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND tenant_id = $2)",
            E::TABLE
        );
        Ok(sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl<E: Record> Repository<E> for PgRepository<E> {
    async fn list(&self, tenant_id: Uuid, query: &ListQuery) -> Result<Page<E>, RepoError> {
        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", E::TABLE));
        push_filters::<E>(&mut count, tenant_id, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", E::TABLE));
        push_filters::<E>(&mut select, tenant_id, query);
        select
            .push(format!(" ORDER BY {}, id LIMIT ", E::ORDER_BY))
            .push_bind(query.per_page)
            .push(" OFFSET ")
            .push_bind(query.offset());
        let items = select.build_query_as::<E>().fetch_all(&self.pool).await?;

        Ok(Page { items, total })
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<E>, RepoError> {
        let sql = format!(
            "SELECT * FROM {} WHERE id = $1 AND tenant_id = $2 AND is_deleted = FALSE",
            E::TABLE
        );
        Ok(sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert(&self, entity: E) -> Result<E, RepoError> {
        let mut statement = insert_statement(&entity);
        statement
            .build_query_as::<E>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error::<E>)
    }

    async fn update(&self, entity: E, expected_version: Option<i64>) -> Result<E, RepoError> {
        let (tenant_id, id) = (entity.meta().tenant_id, entity.meta().id);
        let mut statement = update_statement(&entity, expected_version);
        let updated = statement
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error::<E>)?;

        match updated {
            Some(row) => Ok(row),
            None => {
                if self.get(tenant_id, id).await?.is_some() {
                    debug!(kind = E::KIND, %id, "row version mismatch");
                    Err(RepoError::Concurrency { kind: E::KIND, id })
                } else {
                    Err(RepoError::NotFound { kind: E::KIND, id })
                }
            }
        }
    }

    async fn soft_delete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        actor: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let sql = format!(
            "UPDATE {} SET is_deleted = TRUE, deleted_at = $3, deleted_by = $4, \
             row_version = row_version + 1 \
             WHERE id = $1 AND tenant_id = $2 AND is_deleted = FALSE",
            E::TABLE
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(tenant_id)
            .bind(at)
            .bind(actor)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            Ok(true)
        } else if self.exists_any(tenant_id, id).await? {
            Ok(false)
        } else {
            Err(RepoError::NotFound { kind: E::KIND, id })
        }
    }

    async fn exists_duplicate(&self, entity: &E) -> Result<bool, RepoError> {
        let mut statement = duplicate_statement(entity);
        Ok(statement
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await?)
    }
}

/// Credential storage over the `users` and `refresh_tokens` tables.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Creates a store over the shared pool.
    #[must_use]
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn has_users(&self) -> Result<bool, RepoError> {
        Ok(
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM users WHERE is_deleted = FALSE)",
            )
            .fetch_one(&self.pool)
            .await?,
        )
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE lower(username) = lower($1) AND is_deleted = FALSE",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_deleted = FALSE")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(user_id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
        actor: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = $3, updated_by = $4, row_version = row_version + 1
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(at)
        .bind(actor)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(RepoError::NotFound {
                kind: "User",
                id: user_id,
            })
        }
    }

    async fn insert_refresh_token(&self, token: RefreshToken) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, issued_at, expires_at, revoked_at, replaced_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.issued_at)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .bind(token.replaced_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, RepoError> {
        Ok(
            sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token_hash = $1")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn revoke_refresh_token(
        &self,
        id: Uuid,
        replaced_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2, replaced_by = $3
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(replaced_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_user_tokens(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<u64, RepoError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2 WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{AuditMeta, ClassificationTag, MarketCalendar, User};
    use chrono::NaiveDate;

    fn calendar_day() -> MarketCalendar {
        MarketCalendar {
            meta: AuditMeta::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now()),
            stock_market_id: Uuid::new_v4(),
            calendar_date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            is_trading_day: false,
            is_half_day: false,
            open_time: None,
            close_time: None,
            description: Some("Independence Day".to_string()),
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_insert_statement() {
        let day = calendar_day();
        let sql = insert_statement(&day).into_sql();

        assert!(sql.starts_with(
            "INSERT INTO market_calendars (id, tenant_id, created_at, created_by, is_deleted, row_version, stock_market_id"
        ));
        assert!(sql.contains("VALUES ($1, $2, $3, $4, FALSE, 1, $5"));
        assert!(sql.ends_with("$11) RETURNING *"));
    }

    #[test]
    fn test_update_statement_with_row_version() {
        let day = calendar_day();
        let sql = update_statement(&day, Some(3)).into_sql();

        assert!(sql.starts_with("UPDATE market_calendars SET stock_market_id = $1, "));
        assert!(sql.contains("row_version = row_version + 1 WHERE id = "));
        assert!(sql.contains("AND is_deleted = FALSE AND row_version = $"));
        assert!(sql.ends_with(" RETURNING *"));
    }

    #[test]
    fn test_update_statement_without_row_version() {
        let day = calendar_day();
        let sql = update_statement(&day, None).into_sql();
        assert!(!sql.contains("AND row_version ="));
    }

    #[test]
    fn test_duplicate_statement_tenant_scoping() {
        let tag = ClassificationTag {
            meta: AuditMeta::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now()),
            name: "Growth".to_string(),
            category: "style".to_string(),
            description: None,
            color: None,
        };
        let sql = duplicate_statement(&tag).into_sql();
        assert!(sql.contains("AND tenant_id = $2"));
        assert!(sql.contains("lower(category::text) = lower($3)"));
        assert!(sql.contains("lower(name::text) = lower($4)"));

        let user = User {
            meta: AuditMeta::new(Uuid::new_v4(), Uuid::nil(), Utc::now()),
            username: "ops".to_string(),
            email: "ops@example.com".to_string(),
            display_name: None,
            role: crate::auth::Role::Viewer,
            password_hash: String::new(),
            is_active: true,
            last_login_at: None,
        };
        let sql = duplicate_statement(&user).into_sql();
        assert!(!sql.contains("tenant_id"));
        assert!(sql.contains("lower(username::text) = lower($2)"));
    }

    #[test]
    fn test_user_update_leaves_credentials_alone() {
        let user = User {
            meta: AuditMeta::new(Uuid::new_v4(), Uuid::nil(), Utc::now()),
            username: "ops".to_string(),
            email: "ops@example.com".to_string(),
            display_name: None,
            role: crate::auth::Role::Viewer,
            password_hash: "hash".to_string(),
            is_active: true,
            last_login_at: None,
        };

        let insert = insert_statement(&user).into_sql();
        assert!(insert.contains(", password_hash, last_login_at)"));

        let update = update_statement(&user, None).into_sql();
        assert!(!update.contains("password_hash"));
        assert!(!update.contains("last_login_at"));
    }

    #[test]
    fn test_list_filters() {
        let query = ListQuery {
            search: Some("holiday".to_string()),
            parent_id: Some(Uuid::new_v4()),
            from: NaiveDate::from_ymd_opt(2025, 1, 1),
            to: None,
            active: Some(true),
            ..ListQuery::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM market_calendars");
        push_filters::<MarketCalendar>(&mut builder, Uuid::new_v4(), &query);
        let sql = builder.into_sql();

        assert!(sql.contains("WHERE tenant_id = $1 AND is_deleted = FALSE"));
        assert!(sql.contains("description ILIKE $2"));
        assert!(sql.contains("stock_market_id = $3"));
        assert!(sql.contains("calendar_date >= $4"));
        // MarketCalendar has no active column.
        assert!(!sql.contains("is_active"));
    }
}
