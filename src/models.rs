//! Request and response models for the REST API.

mod calendar;
mod quotes;
mod reference;
mod users;
mod validation;

pub use calendar::{MarketCalendarRequest, MarketCalendarResponse, MarketCalendarUpdateRequest};
pub use quotes::{DailyQuoteParams, QuoteRequest, QuoteResponse};
pub use reference::{
    ClassificationTagRequest, ClassificationTagResponse, CountryRequest, CountryResponse,
    ExchangeRequest, ExchangeResponse, IndustryRequest, IndustryResponse, SectorRequest,
    SectorResponse, StockMarketRequest, StockMarketResponse,
};
pub(crate) use reference::{trimmed, trimmed_opt};
pub use users::{
    ChangePasswordRequest, CreateUserRequest, LoginRequest, RefreshRequest, TokenResponse,
    UpdateUserRequest, UserResponse,
};
pub use validation::{MIN_PASSWORD_LEN, Validate, ValidationError};

use crate::db::{ListQuery, StorageBackend};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// Default page size.
pub const DEFAULT_PER_PAGE: i64 = 20;
/// Largest accepted page size.
pub const MAX_PER_PAGE: i64 = 100;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status, `ok` or `degraded`.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Storage backend in use.
    pub storage: StorageBackend,
    /// Whether the storage backend answered.
    pub database_reachable: bool,
}

// ============================================================================
// Listing
// ============================================================================

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page number, 1-indexed. Defaults to 1.
    #[serde(default)]
    pub page: Option<i64>,
    /// Items per page, 1 to 100. Defaults to 20.
    #[serde(default)]
    pub per_page: Option<i64>,
    /// Case-insensitive substring of the display column.
    #[serde(default)]
    pub search: Option<String>,
    /// Parent filter: country for exchanges, sector for industries, exchange
    /// for stock markets, stock market for calendars.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Inclusive lower date bound (calendars only).
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound (calendars only).
    #[serde(default)]
    pub to: Option<NaiveDate>,
    /// Active flag filter, where the resource has one.
    #[serde(default)]
    pub active: Option<bool>,
}

impl ListParams {
    /// Validates the paging window and converts into a storage query.
    ///
    /// # Errors
    /// Returns an error when page or per_page is out of range or `from`
    /// is after `to`.
    pub fn into_query(self) -> Result<ListQuery, ValidationError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(ValidationError::Format {
                field: "page",
                expected: "at least 1",
            });
        }
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(ValidationError::Format {
                field: "per_page",
                expected: "between 1 and 100",
            });
        }
        if (page - 1).checked_mul(per_page).is_none() {
            return Err(ValidationError::Format {
                field: "page",
                expected: "within the addressable range",
            });
        }
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(ValidationError::Rule("from must not be after to".to_string()));
        }

        Ok(ListQuery {
            page,
            per_page,
            search: self.search,
            parent_id: self.parent_id,
            from: self.from,
            to: self.to,
            active: self.active,
        })
    }
}

/// Pagination metadata for list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMetadata {
    /// Current page number (1-indexed).
    pub page: i64,
    /// Items per page.
    pub per_page: i64,
    /// Total number of matching items.
    pub total: i64,
    /// Total number of pages.
    pub pages: i64,
    /// Whether there is a next page.
    pub has_next: bool,
    /// Whether there is a previous page.
    pub has_prev: bool,
}

impl PaginationMetadata {
    /// Computes the metadata of a page.
    #[must_use]
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageResponse<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Paging information.
    pub pagination: PaginationMetadata,
}
