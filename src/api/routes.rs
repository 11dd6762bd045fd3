//! Route configuration.

use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Authentication
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/refresh", post(handlers::refresh))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::me))
        .route("/api/auth/change-password", post(handlers::change_password))
        // Countries
        .route(
            "/api/countries",
            get(handlers::list_countries).post(handlers::create_country),
        )
        .route(
            "/api/countries/{id}",
            get(handlers::get_country)
                .put(handlers::update_country)
                .delete(handlers::delete_country),
        )
        // Exchanges
        .route(
            "/api/exchanges",
            get(handlers::list_exchanges).post(handlers::create_exchange),
        )
        .route(
            "/api/exchanges/{id}",
            get(handlers::get_exchange)
                .put(handlers::update_exchange)
                .delete(handlers::delete_exchange),
        )
        // Sectors
        .route(
            "/api/sectors",
            get(handlers::list_sectors).post(handlers::create_sector),
        )
        .route(
            "/api/sectors/{id}",
            get(handlers::get_sector)
                .put(handlers::update_sector)
                .delete(handlers::delete_sector),
        )
        // Industries
        .route(
            "/api/industries",
            get(handlers::list_industries).post(handlers::create_industry),
        )
        .route(
            "/api/industries/{id}",
            get(handlers::get_industry)
                .put(handlers::update_industry)
                .delete(handlers::delete_industry),
        )
        // Classification tags
        .route(
            "/api/classification-tags",
            get(handlers::list_classification_tags).post(handlers::create_classification_tag),
        )
        .route(
            "/api/classification-tags/{id}",
            get(handlers::get_classification_tag)
                .put(handlers::update_classification_tag)
                .delete(handlers::delete_classification_tag),
        )
        // Stock markets
        .route(
            "/api/stock-markets",
            get(handlers::list_stock_markets).post(handlers::create_stock_market),
        )
        .route(
            "/api/stock-markets/{id}",
            get(handlers::get_stock_market)
                .put(handlers::update_stock_market)
                .delete(handlers::delete_stock_market),
        )
        // Market calendars
        .route(
            "/api/market-calendars",
            get(handlers::list_market_calendars).post(handlers::create_market_calendar),
        )
        .route(
            "/api/market-calendars/{id}",
            get(handlers::get_market_calendar)
                .put(handlers::update_market_calendar)
                .delete(handlers::delete_market_calendar),
        )
        // Quotes
        .route(
            "/api/quotes",
            get(handlers::list_quotes).post(handlers::create_quote),
        )
        .route("/api/quotes/random", get(handlers::random_quote))
        .route("/api/quotes/daily", get(handlers::daily_quote))
        .route(
            "/api/quotes/{id}",
            get(handlers::get_quote)
                .put(handlers::update_quote)
                .delete(handlers::delete_quote),
        )
        // Users
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .with_state(state)
}
