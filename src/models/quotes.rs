//! Motivational quote payloads.

use super::reference::default_active;
use super::validation::{Validate, ValidationError, optional, required};
use crate::db::Quote;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Body of `POST /api/quotes` and `PUT /api/quotes/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct QuoteRequest {
    /// Quote text.
    pub text: String,
    /// Attributed author.
    #[serde(default)]
    pub author: Option<String>,
    /// Theme, e.g. `discipline`.
    #[serde(default)]
    pub category: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Validate for QuoteRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("text", &self.text, 1000)?;
        optional("author", self.author.as_deref(), 128)?;
        optional("category", self.category.as_deref(), 64)
    }
}

/// A quote.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    /// Quote id.
    pub id: Uuid,
    /// Quote text.
    pub text: String,
    /// Attributed author.
    pub author: Option<String>,
    /// Theme.
    pub category: Option<String>,
    /// Whether the quote is served by random and daily.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

impl From<Quote> for QuoteResponse {
    fn from(q: Quote) -> Self {
        Self {
            id: q.meta.id,
            text: q.text,
            author: q.author,
            category: q.category,
            is_active: q.is_active,
            created_at: q.meta.created_at,
            updated_at: q.meta.updated_at,
            row_version: q.meta.row_version,
        }
    }
}

/// Query parameters of `GET /api/quotes/daily`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
pub struct DailyQuoteParams {
    /// Day to pick the quote for, `YYYY-MM-DD`. Defaults to today (UTC).
    #[serde(default)]
    pub date: Option<NaiveDate>,
}
