//! Random and daily motivational quotes.

use crate::auth::{AuthUser, Permission};
use crate::db::{ListQuery, Store};
use crate::error::ApiError;
use crate::models::QuoteResponse;
use chrono::{Datelike, NaiveDate, Utc};
use rand::Rng;

fn active_quotes(page: i64) -> ListQuery {
    ListQuery {
        page,
        per_page: 1,
        active: Some(true),
        ..ListQuery::default()
    }
}

/// The active quote at `index` in listing order.
async fn quote_at(store: &Store, caller: &AuthUser, index: i64) -> Result<QuoteResponse, ApiError> {
    store
        .quotes
        .list(caller.tenant_id, &active_quotes(index + 1))
        .await?
        .items
        .into_iter()
        .next()
        .map(QuoteResponse::from)
        .ok_or_else(|| ApiError::NotFound("no active quotes".to_string()))
}

async fn count_active(store: &Store, caller: &AuthUser) -> Result<i64, ApiError> {
    let total = store
        .quotes
        .list(caller.tenant_id, &active_quotes(1))
        .await?
        .total;
    if total == 0 {
        return Err(ApiError::NotFound("no active quotes".to_string()));
    }
    Ok(total)
}

/// Position of the quote of `date` among `total` quotes. The same date
/// always maps to the same position while the set of quotes is unchanged,
/// and consecutive dates walk through every quote.
#[must_use]
pub fn daily_index(date: NaiveDate, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    i64::from(date.num_days_from_ce()).rem_euclid(total)
}

/// Any active quote of the caller's tenant.
///
/// # Errors
/// Returns `NotFound` when the tenant has no active quote.
pub async fn random_quote(store: &Store, caller: &AuthUser) -> Result<QuoteResponse, ApiError> {
    caller.require(Permission::Read)?;
    let total = count_active(store, caller).await?;
    let index = rand::thread_rng().gen_range(0..total);
    quote_at(store, caller, index).await
}

/// The quote of a day, today (UTC) when `date` is absent.
///
/// # Errors
/// Returns `NotFound` when the tenant has no active quote.
pub async fn daily_quote(
    store: &Store,
    caller: &AuthUser,
    date: Option<NaiveDate>,
) -> Result<QuoteResponse, ApiError> {
    caller.require(Permission::Read)?;
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let total = count_active(store, caller).await?;
    quote_at(store, caller, daily_index(date, total)).await
}
