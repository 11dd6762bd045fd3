//! Request and response types for the reference data API.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;


fn default_active() -> bool {
    true
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including other master users.
    Master,
    /// Full access except master users.
    Admin,
    /// Reads everything, manages market calendars.
    Trader,
    /// Read only.
    Viewer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Admin => write!(f, "admin"),
            Self::Trader => write!(f, "trader"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

/// Storage backend reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory.
    Memory,
    /// PostgreSQL.
    Postgres,
}

// ============================================================================
// Health & Errors
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Storage backend in use.
    pub storage: StorageBackend,
    /// Whether the storage backend answered.
    pub database_reachable: bool,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable message.
    pub error: String,
    /// Machine readable code.
    pub code: String,
}

// ============================================================================
// Listing
// ============================================================================

/// Query parameters of list endpoints. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number, starting at 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Items per page, at most 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    /// Case-insensitive substring match on the display field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Parent record filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    /// First calendar date, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    /// Last calendar date, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    /// Active flag filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl ListParams {
    /// Parameters for one page.
    #[must_use]
    pub fn page(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    /// Sets the search term.
    #[must_use]
    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    /// Sets the parent filter.
    #[must_use]
    pub fn parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Pagination metadata for list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Paging information.
    pub pagination: PaginationMetadata,
}

// ============================================================================
// Authentication & Users
// ============================================================================

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Refresh or logout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Opaque refresh token.
    pub refresh_token: String,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

/// Token pair issued by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer access token.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Single-use refresh token.
    pub refresh_token: String,
    /// Refresh token expiry.
    pub refresh_expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: UserResponse,
}

/// User as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Role.
    pub role: Role,
    /// Whether the user may log in.
    pub is_active: bool,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

/// User creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Role.
    pub role: Role,
    /// Initial password.
    pub password: String,
    /// Whether the user may log in.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// User replacement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Role.
    pub role: Role,
    /// Whether the user may log in.
    pub is_active: bool,
    /// New password, if it should be reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ============================================================================
// Reference Data
// ============================================================================

/// Country create/replace request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRequest {
    /// Country name.
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub iso_code: String,
    /// ISO 3166-1 alpha-3 code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso3_code: Option<String>,
    /// ISO 4217 currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    /// Active flag.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CountryRequest {
    /// An active country with no optional fields.
    #[must_use]
    pub fn new(name: &str, iso_code: &str) -> Self {
        Self {
            name: name.to_string(),
            iso_code: iso_code.to_string(),
            iso3_code: None,
            currency_code: None,
            is_active: true,
        }
    }
}

/// Country as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Country name.
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub iso_code: String,
    /// ISO 3166-1 alpha-3 code.
    pub iso3_code: Option<String>,
    /// ISO 4217 currency code.
    pub currency_code: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

/// Exchange create/replace request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequest {
    /// Exchange name.
    pub name: String,
    /// ISO 10383 market identifier code.
    pub code: String,
    /// Country the exchange operates in.
    pub country_id: Uuid,
    /// IANA timezone.
    pub timezone: String,
    /// Website.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Active flag.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Exchange as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Exchange name.
    pub name: String,
    /// Market identifier code.
    pub code: String,
    /// Country the exchange operates in.
    pub country_id: Uuid,
    /// IANA timezone.
    pub timezone: String,
    /// Website.
    pub website: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

/// Sector create/replace request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorRequest {
    /// Sector name.
    pub name: String,
    /// Classification code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Sector as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Sector name.
    pub name: String,
    /// Classification code.
    pub code: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

/// Industry create/replace request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryRequest {
    /// Industry name.
    pub name: String,
    /// Classification code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Parent sector.
    pub sector_id: Uuid,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Industry as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Industry name.
    pub name: String,
    /// Classification code.
    pub code: Option<String>,
    /// Parent sector.
    pub sector_id: Uuid,
    /// Description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

/// Classification tag create/replace request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationTagRequest {
    /// Tag name, unique within its category.
    pub name: String,
    /// Category.
    pub category: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display color, `#RRGGBB`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Classification tag as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationTagResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Tag name.
    pub name: String,
    /// Category.
    pub category: String,
    /// Description.
    pub description: Option<String>,
    /// Display color.
    pub color: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

/// Stock market create/replace request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMarketRequest {
    /// Market name.
    pub name: String,
    /// Market code.
    pub code: String,
    /// Exchange hosting the market.
    pub exchange_id: Uuid,
    /// Trading currency.
    pub currency_code: String,
    /// Active flag.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Stock market as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMarketResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Market name.
    pub name: String,
    /// Market code.
    pub code: String,
    /// Exchange hosting the market.
    pub exchange_id: Uuid,
    /// Trading currency.
    pub currency_code: String,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

/// Market calendar day create request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCalendarRequest {
    /// Stock market the day belongs to.
    pub stock_market_id: Uuid,
    /// The day.
    pub calendar_date: NaiveDate,
    /// Whether the market trades.
    pub is_trading_day: bool,
    /// Shortened session.
    #[serde(default)]
    pub is_half_day: bool,
    /// Session open, local exchange time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_time: Option<NaiveTime>,
    /// Session close, local exchange time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_time: Option<NaiveTime>,
    /// Holiday name or note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MarketCalendarRequest {
    /// A non-trading day.
    #[must_use]
    pub fn holiday(stock_market_id: Uuid, calendar_date: NaiveDate, description: &str) -> Self {
        Self {
            stock_market_id,
            calendar_date,
            is_trading_day: false,
            is_half_day: false,
            open_time: None,
            close_time: None,
            description: Some(description.to_string()),
        }
    }
}

/// Market calendar day replace request, carrying the row version read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCalendarUpdateRequest {
    /// New contents of the day.
    #[serde(flatten)]
    pub day: MarketCalendarRequest,
    /// Row version the client last read.
    pub row_version: i64,
}

/// Market calendar day as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCalendarResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Stock market the day belongs to.
    pub stock_market_id: Uuid,
    /// The day.
    pub calendar_date: NaiveDate,
    /// Whether the market trades.
    pub is_trading_day: bool,
    /// Shortened session.
    pub is_half_day: bool,
    /// Session open.
    pub open_time: Option<NaiveTime>,
    /// Session close.
    pub close_time: Option<NaiveTime>,
    /// Holiday name or note.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

// ============================================================================
// Quotes
// ============================================================================

/// Quote create/replace request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Quote text.
    pub text: String,
    /// Author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Only active quotes are served by random and daily.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Quote as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Quote text.
    pub text: String,
    /// Author.
    pub author: Option<String>,
    /// Theme.
    pub category: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

/// Query of the daily quote endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyQuoteQuery {
    /// Day to pick the quote for, today when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}
