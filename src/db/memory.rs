//! In-memory storage used when no database is configured, and by tests.

use super::repository::{CredentialStore, ListQuery, Page, Record, RepoError, Repository};
use super::schema::{RefreshToken, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Rows of one entity type keyed by id.
#[derive(Debug)]
pub struct MemoryRepository<E> {
    rows: DashMap<Uuid, E>,
    /// Serializes check-then-write sequences, standing in for unique indexes.
    write_lock: Mutex<()>,
}

impl<E> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }
}

impl<E: Record> MemoryRepository<E> {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First live row matching `predicate`, regardless of tenant.
    pub fn find_live(&self, predicate: impl Fn(&E) -> bool) -> Option<E> {
        self.rows
            .iter()
            .filter(|entry| !entry.meta().is_deleted && predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .next()
    }

    /// Applies `change` to a live row. Returns `false` if there is none.
    pub fn modify_live(&self, id: Uuid, change: impl FnOnce(&mut E)) -> bool {
        let _guard = self.write_lock.lock();
        match self.rows.get_mut(&id) {
            Some(mut entry) if !entry.meta().is_deleted => {
                change(entry.value_mut());
                true
            }
            _ => false,
        }
    }

    fn live(&self, tenant_id: Uuid, id: Uuid) -> Option<E> {
        self.rows
            .get(&id)
            .filter(|entry| entry.meta().tenant_id == tenant_id && !entry.meta().is_deleted)
            .map(|entry| entry.value().clone())
    }

    fn has_duplicate(&self, candidate: &E) -> bool {
        let key: Vec<String> = candidate
            .unique_key()
            .iter()
            .map(|part| part.to_lowercase())
            .collect();

        self.rows.iter().any(|entry| {
            let other = entry.value();
            let meta = other.meta();
            !meta.is_deleted
                && meta.id != candidate.meta().id
                && (!E::TENANT_SCOPED_UNIQUE || meta.tenant_id == candidate.meta().tenant_id)
                && other
                    .unique_key()
                    .iter()
                    .map(|part| part.to_lowercase())
                    .eq(key.iter().cloned())
        })
    }

    fn duplicate_error(entity: &E) -> RepoError {
        RepoError::Duplicate(format!(
            "{} {} already exists",
            E::KIND,
            entity.unique_key().join(" / ")
        ))
    }
}

#[async_trait]
impl<E: Record> Repository<E> for MemoryRepository<E> {
    async fn list(&self, tenant_id: Uuid, query: &ListQuery) -> Result<Page<E>, RepoError> {
        let mut rows: Vec<E> = self
            .rows
            .iter()
            .filter(|entry| {
                let meta = entry.meta();
                meta.tenant_id == tenant_id && !meta.is_deleted && query.matches(entry.value())
            })
            .map(|entry| entry.value().clone())
            .collect();

        rows.sort_by(|a, b| {
            a.sort_key()
                .cmp(&b.sort_key())
                .then_with(|| a.meta().id.cmp(&b.meta().id))
        });

        let total = rows.len() as i64;
        let items = rows
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .collect();

        Ok(Page { items, total })
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<E>, RepoError> {
        Ok(self.live(tenant_id, id))
    }

    async fn insert(&self, entity: E) -> Result<E, RepoError> {
        let _guard = self.write_lock.lock();

        if self.has_duplicate(&entity) {
            return Err(Self::duplicate_error(&entity));
        }

        self.rows.insert(entity.meta().id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, mut entity: E, expected_version: Option<i64>) -> Result<E, RepoError> {
        let _guard = self.write_lock.lock();
        let id = entity.meta().id;

        let current = self
            .live(entity.meta().tenant_id, id)
            .ok_or(RepoError::NotFound { kind: E::KIND, id })?;

        if let Some(expected) = expected_version
            && current.meta().row_version != expected
        {
            return Err(RepoError::Concurrency { kind: E::KIND, id });
        }

        if self.has_duplicate(&entity) {
            return Err(Self::duplicate_error(&entity));
        }

        entity.carry_credentials(&current);

        // The audit header of the stored row is authoritative except for the update stamp.
        let (updated_at, updated_by) = (entity.meta().updated_at, entity.meta().updated_by);
        *entity.meta_mut() = current.meta().clone();
        let meta = entity.meta_mut();
        meta.updated_at = updated_at;
        meta.updated_by = updated_by;
        meta.row_version += 1;

        self.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn soft_delete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        actor: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let _guard = self.write_lock.lock();

        match self.rows.get_mut(&id) {
            Some(mut entry) if entry.meta().tenant_id == tenant_id => {
                if entry.meta().is_deleted {
                    Ok(false)
                } else {
                    entry.value_mut().meta_mut().mark_deleted(actor, at);
                    Ok(true)
                }
            }
            _ => Err(RepoError::NotFound { kind: E::KIND, id }),
        }
    }

    async fn exists_duplicate(&self, entity: &E) -> Result<bool, RepoError> {
        Ok(self.has_duplicate(entity))
    }
}

/// Credential storage over the in-memory user table.
#[derive(Debug)]
pub struct MemoryCredentialStore {
    users: Arc<MemoryRepository<User>>,
    tokens: DashMap<Uuid, RefreshToken>,
}

impl MemoryCredentialStore {
    /// Creates a store sharing `users` with the user repository.
    #[must_use]
    pub fn new(users: Arc<MemoryRepository<User>>) -> Self {
        Self {
            users,
            tokens: DashMap::new(),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn has_users(&self) -> Result<bool, RepoError> {
        Ok(self.users.find_live(|_| true).is_some())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let wanted = username.to_lowercase();
        Ok(self
            .users
            .find_live(|user| user.username.to_lowercase() == wanted))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.find_live(|user| user.meta.id == id))
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        self.users
            .modify_live(user_id, |user| user.last_login_at = Some(at));
        Ok(())
    }

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
        actor: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let changed = self.users.modify_live(user_id, |user| {
            user.password_hash = password_hash.to_string();
            user.meta.touch(actor, at);
            user.meta.row_version += 1;
        });

        if changed {
            Ok(())
        } else {
            Err(RepoError::NotFound {
                kind: "User",
                id: user_id,
            })
        }
    }

    async fn insert_refresh_token(&self, token: RefreshToken) -> Result<(), RepoError> {
        self.tokens.insert(token.id, token);
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, RepoError> {
        Ok(self
            .tokens
            .iter()
            .find(|entry| entry.token_hash == token_hash)
            .map(|entry| entry.value().clone()))
    }

    async fn revoke_refresh_token(
        &self,
        id: Uuid,
        replaced_by: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        match self.tokens.get_mut(&id) {
            Some(mut token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(at);
                token.replaced_by = replaced_by;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_user_tokens(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut revoked = 0;
        for mut token in self.tokens.iter_mut() {
            if token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(at);
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}
