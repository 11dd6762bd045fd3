//! Reference data payloads: countries, exchanges, sectors, industries,
//! classification tags and stock markets.

use super::validation::{
    Validate, ValidationError, hex_color, http_url, mic, optional, required, upper_alpha,
};
use crate::db::{ClassificationTag, Country, Exchange, Industry, Sector, StockMarket};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

const NAME_MAX: usize = 128;
const DESCRIPTION_MAX: usize = 1000;

pub(crate) fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

pub(crate) fn trimmed_opt(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

// ============================================================================
// Countries
// ============================================================================

/// Body of `POST /api/countries` and `PUT /api/countries/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CountryRequest {
    /// Country name.
    pub name: String,
    /// ISO 3166-1 alpha-2 code, e.g. `US`.
    pub iso_code: String,
    /// ISO 3166-1 alpha-3 code, e.g. `USA`.
    #[serde(default)]
    pub iso3_code: Option<String>,
    /// ISO 4217 currency code, e.g. `USD`.
    #[serde(default)]
    pub currency_code: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

pub(crate) fn default_active() -> bool {
    true
}

impl Validate for CountryRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, NAME_MAX)?;
        upper_alpha("iso_code", &self.iso_code, 2, "2 uppercase letters")?;
        if let Some(iso3) = &self.iso3_code {
            upper_alpha("iso3_code", iso3, 3, "3 uppercase letters")?;
        }
        if let Some(currency) = &self.currency_code {
            upper_alpha("currency_code", currency, 3, "3 uppercase letters")?;
        }
        Ok(())
    }
}

/// A country.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountryResponse {
    /// Country id.
    pub id: Uuid,
    /// Country name.
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub iso_code: String,
    /// ISO 3166-1 alpha-3 code.
    pub iso3_code: Option<String>,
    /// ISO 4217 currency code.
    pub currency_code: Option<String>,
    /// Whether the country is selectable.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

impl From<Country> for CountryResponse {
    fn from(c: Country) -> Self {
        Self {
            id: c.meta.id,
            name: c.name,
            iso_code: c.iso_code,
            iso3_code: c.iso3_code,
            currency_code: c.currency_code,
            is_active: c.is_active,
            created_at: c.meta.created_at,
            updated_at: c.meta.updated_at,
            row_version: c.meta.row_version,
        }
    }
}

// ============================================================================
// Exchanges
// ============================================================================

/// Body of `POST /api/exchanges` and `PUT /api/exchanges/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ExchangeRequest {
    /// Exchange name.
    pub name: String,
    /// ISO 10383 MIC, e.g. `XNYS`.
    pub code: String,
    /// Country the exchange operates in.
    pub country_id: Uuid,
    /// IANA time zone, e.g. `America/New_York`.
    pub timezone: String,
    /// Public website.
    #[serde(default)]
    pub website: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Validate for ExchangeRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, NAME_MAX)?;
        mic("code", &self.code)?;
        required("timezone", &self.timezone, 64)?;
        if self.timezone.contains(char::is_whitespace) {
            return Err(ValidationError::Format {
                field: "timezone",
                expected: "an IANA time zone name",
            });
        }
        if let Some(website) = &self.website {
            http_url("website", website)?;
        }
        Ok(())
    }
}

/// An exchange.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeResponse {
    /// Exchange id.
    pub id: Uuid,
    /// Exchange name.
    pub name: String,
    /// ISO 10383 MIC.
    pub code: String,
    /// Country the exchange operates in.
    pub country_id: Uuid,
    /// IANA time zone.
    pub timezone: String,
    /// Public website.
    pub website: Option<String>,
    /// Whether the exchange is selectable.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

impl From<Exchange> for ExchangeResponse {
    fn from(e: Exchange) -> Self {
        Self {
            id: e.meta.id,
            name: e.name,
            code: e.code,
            country_id: e.country_id,
            timezone: e.timezone,
            website: e.website,
            is_active: e.is_active,
            created_at: e.meta.created_at,
            updated_at: e.meta.updated_at,
            row_version: e.meta.row_version,
        }
    }
}

// ============================================================================
// Sectors and Industries
// ============================================================================

/// Body of `POST /api/sectors` and `PUT /api/sectors/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SectorRequest {
    /// Sector name.
    pub name: String,
    /// Classification code.
    #[serde(default)]
    pub code: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for SectorRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, NAME_MAX)?;
        optional("code", self.code.as_deref(), 32)?;
        optional("description", self.description.as_deref(), DESCRIPTION_MAX)
    }
}

/// A sector.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectorResponse {
    /// Sector id.
    pub id: Uuid,
    /// Sector name.
    pub name: String,
    /// Classification code.
    pub code: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

impl From<Sector> for SectorResponse {
    fn from(s: Sector) -> Self {
        Self {
            id: s.meta.id,
            name: s.name,
            code: s.code,
            description: s.description,
            created_at: s.meta.created_at,
            updated_at: s.meta.updated_at,
            row_version: s.meta.row_version,
        }
    }
}

/// Body of `POST /api/industries` and `PUT /api/industries/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct IndustryRequest {
    /// Industry name.
    pub name: String,
    /// Classification code.
    #[serde(default)]
    pub code: Option<String>,
    /// Parent sector.
    pub sector_id: Uuid,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for IndustryRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, NAME_MAX)?;
        optional("code", self.code.as_deref(), 32)?;
        optional("description", self.description.as_deref(), DESCRIPTION_MAX)
    }
}

/// An industry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IndustryResponse {
    /// Industry id.
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
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

impl From<Industry> for IndustryResponse {
    fn from(i: Industry) -> Self {
        Self {
            id: i.meta.id,
            name: i.name,
            code: i.code,
            sector_id: i.sector_id,
            description: i.description,
            created_at: i.meta.created_at,
            updated_at: i.meta.updated_at,
            row_version: i.meta.row_version,
        }
    }
}

// ============================================================================
// Classification Tags
// ============================================================================

/// Body of `POST /api/classification-tags` and `PUT /api/classification-tags/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ClassificationTagRequest {
    /// Tag name.
    pub name: String,
    /// Grouping, e.g. `style` or `theme`.
    pub category: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Display color, `#RRGGBB`.
    #[serde(default)]
    pub color: Option<String>,
}

impl Validate for ClassificationTagRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, 64)?;
        required("category", &self.category, 64)?;
        optional("description", self.description.as_deref(), DESCRIPTION_MAX)?;
        if let Some(color) = &self.color {
            hex_color("color", color)?;
        }
        Ok(())
    }
}

/// A classification tag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassificationTagResponse {
    /// Tag id.
    pub id: Uuid,
    /// Tag name.
    pub name: String,
    /// Grouping.
    pub category: String,
    /// Description.
    pub description: Option<String>,
    /// Display color.
    pub color: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

impl From<ClassificationTag> for ClassificationTagResponse {
    fn from(t: ClassificationTag) -> Self {
        Self {
            id: t.meta.id,
            name: t.name,
            category: t.category,
            description: t.description,
            color: t.color,
            created_at: t.meta.created_at,
            updated_at: t.meta.updated_at,
            row_version: t.meta.row_version,
        }
    }
}

// ============================================================================
// Stock Markets
// ============================================================================

/// Body of `POST /api/stock-markets` and `PUT /api/stock-markets/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct StockMarketRequest {
    /// Market name.
    pub name: String,
    /// Market code.
    pub code: String,
    /// Exchange hosting the market.
    pub exchange_id: Uuid,
    /// Trading currency, ISO 4217.
    pub currency_code: String,
    /// Defaults to `true`.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Validate for StockMarketRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, NAME_MAX)?;
        required("code", &self.code, 16)?;
        if self.code.contains(char::is_whitespace) {
            return Err(ValidationError::Format {
                field: "code",
                expected: "a code without spaces",
            });
        }
        upper_alpha("currency_code", &self.currency_code, 3, "3 uppercase letters")
    }
}

/// A stock market.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockMarketResponse {
    /// Market id.
    pub id: Uuid,
    /// Market name.
    pub name: String,
    /// Market code.
    pub code: String,
    /// Exchange hosting the market.
    pub exchange_id: Uuid,
    /// Trading currency.
    pub currency_code: String,
    /// Whether the market is selectable.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

impl From<StockMarket> for StockMarketResponse {
    fn from(m: StockMarket) -> Self {
        Self {
            id: m.meta.id,
            name: m.name,
            code: m.code,
            exchange_id: m.exchange_id,
            currency_code: m.currency_code,
            is_active: m.is_active,
            created_at: m.meta.created_at,
            updated_at: m.meta.updated_at,
            row_version: m.meta.row_version,
        }
    }
}
