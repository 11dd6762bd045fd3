//! Binds each entity to its payloads, repository and permissions.

use crate::auth::Permission;
use crate::db::{
    AuditMeta, ClassificationTag, Country, Exchange, Industry, MarketCalendar, Quote, Record,
    Repository, Sector, StockMarket, Store, User,
};
use crate::models::{
    ClassificationTagRequest, ClassificationTagResponse, CountryRequest, CountryResponse,
    ExchangeRequest, ExchangeResponse, IndustryRequest, IndustryResponse, MarketCalendarRequest,
    MarketCalendarResponse, MarketCalendarUpdateRequest, QuoteRequest, QuoteResponse,
    SectorRequest, SectorResponse, StockMarketRequest, StockMarketResponse, UserResponse,
    Validate, trimmed, trimmed_opt,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// A row another row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// `country_id`.
    Country(Uuid),
    /// `sector_id`.
    Sector(Uuid),
    /// `exchange_id`.
    Exchange(Uuid),
    /// `stock_market_id`.
    StockMarket(Uuid),
}

/// An entity served by the generic list and get endpoints.
pub trait Resource: Record {
    /// Wire representation.
    type Response: From<Self> + Serialize + Send + 'static;

    /// Permission needed to list and read.
    const READ: Permission = Permission::Read;

    /// The entity's repository.
    fn repository(store: &Store) -> &Arc<dyn Repository<Self>>;
}

/// An entity also served by the generic create, update and delete endpoints.
pub trait Editable: Resource {
    /// Body of create.
    type Create: Validate + Send + 'static;
    /// Body of update, a full replacement.
    type Update: Validate + Send + 'static;

    /// Permission needed to create, update and delete.
    const WRITE: Permission;

    /// Builds a new row.
    fn create(request: Self::Create, meta: AuditMeta) -> Self;

    /// Overwrites the data columns.
    fn apply(&mut self, request: Self::Update);

    /// Row version the update must be based on, for resources that demand one.
    fn expected_version(_request: &Self::Update) -> Option<i64> {
        None
    }

    /// Rows that must exist in the same tenant.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

// ============================================================================
// Countries and Exchanges
// ============================================================================

impl Resource for Country {
    type Response = CountryResponse;

    fn repository(store: &Store) -> &Arc<dyn Repository<Self>> {
        &store.countries
    }
}

impl Editable for Country {
    type Create = CountryRequest;
    type Update = CountryRequest;
    const WRITE: Permission = Permission::ManageReferenceData;

    fn create(request: CountryRequest, meta: AuditMeta) -> Self {
        Self {
            meta,
            name: trimmed(&request.name),
            iso_code: request.iso_code,
            iso3_code: request.iso3_code,
            currency_code: request.currency_code,
            is_active: request.is_active,
        }
    }

    fn apply(&mut self, request: CountryRequest) {
        self.name = trimmed(&request.name);
        self.iso_code = request.iso_code;
        self.iso3_code = request.iso3_code;
        self.currency_code = request.currency_code;
        self.is_active = request.is_active;
    }
}

impl Resource for Exchange {
    type Response = ExchangeResponse;

    fn repository(store: &Store) -> &Arc<dyn Repository<Self>> {
        &store.exchanges
    }
}

impl Editable for Exchange {
    type Create = ExchangeRequest;
    type Update = ExchangeRequest;
    const WRITE: Permission = Permission::ManageReferenceData;

    fn create(request: ExchangeRequest, meta: AuditMeta) -> Self {
        Self {
            meta,
            name: trimmed(&request.name),
            code: request.code,
            country_id: request.country_id,
            timezone: request.timezone,
            website: trimmed_opt(request.website.as_deref()),
            is_active: request.is_active,
        }
    }

    fn apply(&mut self, request: ExchangeRequest) {
        self.name = trimmed(&request.name);
        self.code = request.code;
        self.country_id = request.country_id;
        self.timezone = request.timezone;
        self.website = trimmed_opt(request.website.as_deref());
        self.is_active = request.is_active;
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::Country(self.country_id)]
    }
}

// ============================================================================
// Sectors, Industries and Tags
// ============================================================================

impl Resource for Sector {
    type Response = SectorResponse;

    fn repository(store: &Store) -> &Arc<dyn Repository<Self>> {
        &store.sectors
    }
}

impl Editable for Sector {
    type Create = SectorRequest;
    type Update = SectorRequest;
    const WRITE: Permission = Permission::ManageReferenceData;

    fn create(request: SectorRequest, meta: AuditMeta) -> Self {
        Self {
            meta,
            name: trimmed(&request.name),
            code: trimmed_opt(request.code.as_deref()),
            description: trimmed_opt(request.description.as_deref()),
        }
    }

    fn apply(&mut self, request: SectorRequest) {
        self.name = trimmed(&request.name);
        self.code = trimmed_opt(request.code.as_deref());
        self.description = trimmed_opt(request.description.as_deref());
    }
}

impl Resource for Industry {
    type Response = IndustryResponse;

    fn repository(store: &Store) -> &Arc<dyn Repository<Self>> {
        &store.industries
    }
}

impl Editable for Industry {
    type Create = IndustryRequest;
    type Update = IndustryRequest;
    const WRITE: Permission = Permission::ManageReferenceData;

    fn create(request: IndustryRequest, meta: AuditMeta) -> Self {
        Self {
            meta,
            name: trimmed(&request.name),
            code: trimmed_opt(request.code.as_deref()),
            sector_id: request.sector_id,
            description: trimmed_opt(request.description.as_deref()),
        }
    }

    fn apply(&mut self, request: IndustryRequest) {
        self.name = trimmed(&request.name);
        self.code = trimmed_opt(request.code.as_deref());
        self.sector_id = request.sector_id;
        self.description = trimmed_opt(request.description.as_deref());
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::Sector(self.sector_id)]
    }
}

impl Resource for ClassificationTag {
    type Response = ClassificationTagResponse;

    fn repository(store: &Store) -> &Arc<dyn Repository<Self>> {
        &store.classification_tags
    }
}

impl Editable for ClassificationTag {
    type Create = ClassificationTagRequest;
    type Update = ClassificationTagRequest;
    const WRITE: Permission = Permission::ManageReferenceData;

    fn create(request: ClassificationTagRequest, meta: AuditMeta) -> Self {
        Self {
            meta,
            name: trimmed(&request.name),
            category: trimmed(&request.category),
            description: trimmed_opt(request.description.as_deref()),
            color: request.color,
        }
    }

    fn apply(&mut self, request: ClassificationTagRequest) {
        self.name = trimmed(&request.name);
        self.category = trimmed(&request.category);
        self.description = trimmed_opt(request.description.as_deref());
        self.color = request.color;
    }
}

// ============================================================================
// Stock Markets and Calendars
// ============================================================================

impl Resource for StockMarket {
    type Response = StockMarketResponse;

    fn repository(store: &Store) -> &Arc<dyn Repository<Self>> {
        &store.stock_markets
    }
}

impl Editable for StockMarket {
    type Create = StockMarketRequest;
    type Update = StockMarketRequest;
    const WRITE: Permission = Permission::ManageReferenceData;

    fn create(request: StockMarketRequest, meta: AuditMeta) -> Self {
        Self {
            meta,
            name: trimmed(&request.name),
            code: request.code,
            exchange_id: request.exchange_id,
            currency_code: request.currency_code,
            is_active: request.is_active,
        }
    }

    fn apply(&mut self, request: StockMarketRequest) {
        self.name = trimmed(&request.name);
        self.code = request.code;
        self.exchange_id = request.exchange_id;
        self.currency_code = request.currency_code;
        self.is_active = request.is_active;
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::Exchange(self.exchange_id)]
    }
}

impl Resource for MarketCalendar {
    type Response = MarketCalendarResponse;

    fn repository(store: &Store) -> &Arc<dyn Repository<Self>> {
        &store.market_calendars
    }
}

impl Editable for MarketCalendar {
    type Create = MarketCalendarRequest;
    type Update = MarketCalendarUpdateRequest;
    const WRITE: Permission = Permission::ManageCalendars;

    fn create(request: MarketCalendarRequest, meta: AuditMeta) -> Self {
        Self {
            meta,
            stock_market_id: request.stock_market_id,
            calendar_date: request.calendar_date,
            is_trading_day: request.is_trading_day,
            is_half_day: request.is_half_day,
            open_time: request.open_time,
            close_time: request.close_time,
            description: trimmed_opt(request.description.as_deref()),
        }
    }

    fn apply(&mut self, request: MarketCalendarUpdateRequest) {
        let day = request.day;
        self.stock_market_id = day.stock_market_id;
        self.calendar_date = day.calendar_date;
        self.is_trading_day = day.is_trading_day;
        self.is_half_day = day.is_half_day;
        self.open_time = day.open_time;
        self.close_time = day.close_time;
        self.description = trimmed_opt(day.description.as_deref());
    }

    fn expected_version(request: &MarketCalendarUpdateRequest) -> Option<i64> {
        Some(request.row_version)
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::StockMarket(self.stock_market_id)]
    }
}

// ============================================================================
// Users and Quotes
// ============================================================================

impl Resource for User {
    type Response = UserResponse;
    const READ: Permission = Permission::ManageUsers;

    fn repository(store: &Store) -> &Arc<dyn Repository<Self>> {
        &store.users
    }
}

impl Resource for Quote {
    type Response = QuoteResponse;

    fn repository(store: &Store) -> &Arc<dyn Repository<Self>> {
        &store.quotes
    }
}

impl Editable for Quote {
    type Create = QuoteRequest;
    type Update = QuoteRequest;
    const WRITE: Permission = Permission::ManageQuotes;

    fn create(request: QuoteRequest, meta: AuditMeta) -> Self {
        Self {
            meta,
            text: trimmed(&request.text),
            author: trimmed_opt(request.author.as_deref()),
            category: trimmed_opt(request.category.as_deref()),
            is_active: request.is_active,
        }
    }

    fn apply(&mut self, request: QuoteRequest) {
        self.text = trimmed(&request.text);
        self.author = trimmed_opt(request.author.as_deref());
        self.category = trimmed_opt(request.category.as_deref());
        self.is_active = request.is_active;
    }
}
