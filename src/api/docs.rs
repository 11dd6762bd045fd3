//! OpenAPI documentation.

use crate::api::handlers;
use crate::auth::Role;
use crate::db::StorageBackend;
use crate::error::{ErrorResponse, RateLimitErrorResponse};
use crate::models::{
    ChangePasswordRequest, ClassificationTagRequest, ClassificationTagResponse, CountryRequest,
    CountryResponse, CreateUserRequest, ExchangeRequest, ExchangeResponse, HealthResponse,
    IndustryRequest, IndustryResponse, LoginRequest, MarketCalendarRequest,
    MarketCalendarResponse, MarketCalendarUpdateRequest, PaginationMetadata, QuoteRequest,
    QuoteResponse, RefreshRequest, SectorRequest, SectorResponse, StockMarketRequest,
    StockMarketResponse, TokenResponse, UpdateUserRequest, UserResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the bearer JWT scheme referenced by protected operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::login,
        handlers::refresh,
        handlers::logout,
        handlers::me,
        handlers::change_password,
        handlers::list_countries,
        handlers::get_country,
        handlers::create_country,
        handlers::update_country,
        handlers::delete_country,
        handlers::list_exchanges,
        handlers::get_exchange,
        handlers::create_exchange,
        handlers::update_exchange,
        handlers::delete_exchange,
        handlers::list_sectors,
        handlers::get_sector,
        handlers::create_sector,
        handlers::update_sector,
        handlers::delete_sector,
        handlers::list_industries,
        handlers::get_industry,
        handlers::create_industry,
        handlers::update_industry,
        handlers::delete_industry,
        handlers::list_classification_tags,
        handlers::get_classification_tag,
        handlers::create_classification_tag,
        handlers::update_classification_tag,
        handlers::delete_classification_tag,
        handlers::list_stock_markets,
        handlers::get_stock_market,
        handlers::create_stock_market,
        handlers::update_stock_market,
        handlers::delete_stock_market,
        handlers::list_market_calendars,
        handlers::get_market_calendar,
        handlers::create_market_calendar,
        handlers::update_market_calendar,
        handlers::delete_market_calendar,
        handlers::list_quotes,
        handlers::get_quote,
        handlers::create_quote,
        handlers::update_quote,
        handlers::delete_quote,
        handlers::random_quote,
        handlers::daily_quote,
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
    ),
    components(
        schemas(
            HealthResponse,
            StorageBackend,
            ErrorResponse,
            RateLimitErrorResponse,
            PaginationMetadata,
            Role,
            LoginRequest,
            RefreshRequest,
            ChangePasswordRequest,
            TokenResponse,
            CountryRequest,
            CountryResponse,
            ExchangeRequest,
            ExchangeResponse,
            SectorRequest,
            SectorResponse,
            IndustryRequest,
            IndustryResponse,
            ClassificationTagRequest,
            ClassificationTagResponse,
            StockMarketRequest,
            StockMarketResponse,
            MarketCalendarRequest,
            MarketCalendarUpdateRequest,
            MarketCalendarResponse,
            QuoteRequest,
            QuoteResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Login, token rotation and the caller's account"),
        (name = "Countries", description = "Country reference data"),
        (name = "Exchanges", description = "Exchange reference data"),
        (name = "Sectors", description = "Sector classification"),
        (name = "Industries", description = "Industry classification within sectors"),
        (name = "Classification Tags", description = "Free-form classification tags"),
        (name = "Stock Markets", description = "Markets listed on exchanges"),
        (name = "Market Calendars", description = "Trading days, holidays and half days"),
        (name = "Quotes", description = "Motivational quotes"),
        (name = "Users", description = "User administration"),
    ),
    info(
        title = "Reference Data Admin API",
        version = "0.1.0",
        description = "Multi-tenant administration of market reference data",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;
