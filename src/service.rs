//! Business rules between the HTTP handlers and storage.
//!
//! Every reference data resource goes through the same flow: permission
//! check, validation, reference and duplicate checks, audit stamping and
//! persistence. [`Resource`] and [`Editable`] describe what differs per
//! entity; users, sessions and quotes add their own operations on top.

mod quotes;
mod resources;
mod sessions;
mod users;

pub use quotes::{daily_quote, daily_index, random_quote};
pub use resources::{Editable, Reference, Resource};
pub use sessions::{change_password, login, logout, me, refresh};
pub use users::{create_user, delete_user, update_user};

use crate::auth::AuthUser;
use crate::db::{AuditMeta, Record, Repository, Store};
use crate::error::ApiError;
use crate::models::{ListParams, PageResponse, PaginationMetadata, Validate};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;


/// Lists live rows of the caller's tenant.
///
/// # Errors
/// Returns `Forbidden`, or `InvalidRequest` for bad paging or a filter the
/// resource does not support.
pub async fn list<R: Resource>(
    store: &Store,
    caller: &AuthUser,
    params: ListParams,
) -> Result<PageResponse<R::Response>, ApiError> {
    caller.require(R::READ)?;
    let query = params.into_query()?;

    if query.parent_id.is_some() && R::PARENT_COLUMN.is_none() {
        return Err(unsupported_filter::<R>("parent_id"));
    }
    if (query.from.is_some() || query.to.is_some()) && R::DATE_COLUMN.is_none() {
        return Err(unsupported_filter::<R>("from/to"));
    }
    if query.active.is_some() && R::ACTIVE_COLUMN.is_none() {
        return Err(unsupported_filter::<R>("active"));
    }

    let page = R::repository(store).list(caller.tenant_id, &query).await?;

    Ok(PageResponse {
        items: page.items.into_iter().map(R::Response::from).collect(),
        pagination: PaginationMetadata::new(query.page, query.per_page, page.total),
    })
}

fn unsupported_filter<R: Record>(filter: &str) -> ApiError {
    ApiError::InvalidRequest(format!("{} does not support the {} filter", R::KIND, filter))
}

/// Fetches one live row of the caller's tenant.
///
/// # Errors
/// Returns `Forbidden` or `NotFound`.
pub async fn get<R: Resource>(
    store: &Store,
    caller: &AuthUser,
    id: Uuid,
) -> Result<R::Response, ApiError> {
    caller.require(R::READ)?;
    load::<R>(store, caller.tenant_id, id).await.map(R::Response::from)
}

pub(crate) async fn load<R: Resource>(
    store: &Store,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<R, ApiError> {
    R::repository(store)
        .get(tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} {}", R::KIND, id)))
}

/// Creates a row in the caller's tenant.
///
/// # Errors
/// Returns `Forbidden`, `InvalidRequest` on validation or an unknown
/// reference, and `Duplicate` when the unique key is taken.
#[instrument(skip_all, fields(kind = R::KIND, tenant = %caller.tenant_id))]
pub async fn create<R: Editable>(
    store: &Store,
    caller: &AuthUser,
    request: R::Create,
) -> Result<R::Response, ApiError> {
    caller.require(R::WRITE)?;
    request.validate()?;

    let entity = R::create(
        request,
        AuditMeta::new(caller.tenant_id, caller.user_id, Utc::now()),
    );
    ensure_references(store, caller.tenant_id, &entity.references()).await?;

    let repository = R::repository(store);
    ensure_unique(repository.as_ref(), &entity).await?;

    let created = repository.insert(entity).await?;
    info!(id = %created.meta().id, "created");
    Ok(created.into())
}

/// Replaces the data columns of a row.
///
/// # Errors
/// Returns `Forbidden`, `InvalidRequest`, `NotFound`, `Duplicate`, or
/// `ConcurrencyConflict` when the resource demands a row version and it is
/// stale.
#[instrument(skip_all, fields(kind = R::KIND, tenant = %caller.tenant_id, id = %id))]
pub async fn update<R: Editable>(
    store: &Store,
    caller: &AuthUser,
    id: Uuid,
    request: R::Update,
) -> Result<R::Response, ApiError> {
    caller.require(R::WRITE)?;
    request.validate()?;

    let mut entity = load::<R>(store, caller.tenant_id, id).await?;
    let expected_version = R::expected_version(&request);
    if let Some(expected) = expected_version
        && expected != entity.meta().row_version
    {
        return Err(ApiError::ConcurrencyConflict(format!(
            "{} {} is at version {}, not {}",
            R::KIND,
            id,
            entity.meta().row_version,
            expected
        )));
    }

    entity.apply(request);
    entity.meta_mut().touch(caller.user_id, Utc::now());
    ensure_references(store, caller.tenant_id, &entity.references()).await?;

    let repository = R::repository(store);
    ensure_unique(repository.as_ref(), &entity).await?;

    let updated = repository.update(entity, expected_version).await?;
    info!(row_version = updated.meta().row_version, "updated");
    Ok(updated.into())
}

/// Soft deletes a row. Deleting an already deleted row succeeds.
///
/// # Errors
/// Returns `Forbidden`, or `NotFound` when the id never existed in the tenant.
#[instrument(skip_all, fields(kind = R::KIND, tenant = %caller.tenant_id, id = %id))]
pub async fn delete<R: Editable>(
    store: &Store,
    caller: &AuthUser,
    id: Uuid,
) -> Result<(), ApiError> {
    caller.require(R::WRITE)?;

    let deleted = R::repository(store)
        .soft_delete(caller.tenant_id, id, caller.user_id, Utc::now())
        .await?;
    if deleted {
        info!("deleted");
    }
    Ok(())
}

/// Fails with `InvalidRequest` unless every reference is a live row of the tenant.
pub(crate) async fn ensure_references(
    store: &Store,
    tenant_id: Uuid,
    references: &[Reference],
) -> Result<(), ApiError> {
    for reference in references {
        let (field, exists) = match *reference {
            Reference::Country(id) => (
                "country_id",
                store.countries.get(tenant_id, id).await?.is_some(),
            ),
            Reference::Sector(id) => (
                "sector_id",
                store.sectors.get(tenant_id, id).await?.is_some(),
            ),
            Reference::Exchange(id) => (
                "exchange_id",
                store.exchanges.get(tenant_id, id).await?.is_some(),
            ),
            Reference::StockMarket(id) => (
                "stock_market_id",
                store.stock_markets.get(tenant_id, id).await?.is_some(),
            ),
        };
        if !exists {
            return Err(ApiError::InvalidRequest(format!(
                "{} refers to a record that does not exist",
                field
            )));
        }
    }
    Ok(())
}

/// Fails with `Duplicate` when another live row holds the unique key.
pub(crate) async fn ensure_unique<E: Record>(
    repository: &dyn Repository<E>,
    entity: &E,
) -> Result<(), ApiError> {
    if repository.exists_duplicate(entity).await? {
        return Err(ApiError::Duplicate(format!(
            "{} with {} '{}' already exists",
            E::KIND,
            E::UNIQUE_COLUMNS.join(" / "),
            entity.unique_key().join(" / ")
        )));
    }
    Ok(())
}
