//! API request handlers.

use crate::api::middleware::ClientAddr;
use crate::auth::AuthUser;
use crate::db::{
    ClassificationTag, Country, Exchange, Industry, MarketCalendar, Quote, Sector, StockMarket,
    User,
};
use crate::error::{ApiError, ErrorResponse, RateLimitErrorResponse};
use crate::models::{
    ChangePasswordRequest, ClassificationTagRequest, ClassificationTagResponse, CountryRequest,
    CountryResponse, CreateUserRequest, DailyQuoteParams, ExchangeRequest, ExchangeResponse,
    HealthResponse, IndustryRequest, IndustryResponse, ListParams, LoginRequest,
    MarketCalendarRequest, MarketCalendarResponse, MarketCalendarUpdateRequest, PageResponse,
    QuoteRequest, QuoteResponse, RefreshRequest, SectorRequest, SectorResponse,
    StockMarketRequest, StockMarketResponse, TokenResponse, UpdateUserRequest, UserResponse,
};
use crate::service;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;
use uuid::Uuid;

/// Generates the list/get/create/update/delete handlers of a resource that
/// goes through the generic service flow.
macro_rules! crud_handlers {
    (
        entity: $entity:ident,
        tag: $tag:literal,
        collection: $collection:literal,
        item: $item:literal,
        create: $create:ident,
        update: $update:ident,
        response: $response:ident,
        handlers: ($list:ident, $get:ident, $post:ident, $put:ident, $delete:ident) $(,)?
    ) => {
        /// Lists live records of the caller's tenant.
        #[utoipa::path(
            get,
            path = $collection,
            params(ListParams),
            responses(
                (status = 200, description = "Page of records", body = PageResponse<$response>),
                (status = 400, description = "Invalid paging or filter", body = ErrorResponse),
                (status = 401, description = "Missing or invalid token", body = ErrorResponse),
                (status = 403, description = "Role not allowed", body = ErrorResponse)
            ),
            security(("bearer_auth" = [])),
            tag = $tag
        )]
        pub async fn $list(
            State(state): State<Arc<AppState>>,
            caller: AuthUser,
            Query(params): Query<ListParams>,
        ) -> Result<Json<PageResponse<$response>>, ApiError> {
            service::list::<$entity>(&state.store, &caller, params)
                .await
                .map(Json)
        }

        /// Gets one record.
        #[utoipa::path(
            get,
            path = $item,
            params(("id" = Uuid, Path, description = "Record id")),
            responses(
                (status = 200, description = "Record found", body = $response),
                (status = 401, description = "Missing or invalid token", body = ErrorResponse),
                (status = 404, description = "Record not found", body = ErrorResponse)
            ),
            security(("bearer_auth" = [])),
            tag = $tag
        )]
        pub async fn $get(
            State(state): State<Arc<AppState>>,
            caller: AuthUser,
            Path(id): Path<Uuid>,
        ) -> Result<Json<$response>, ApiError> {
            service::get::<$entity>(&state.store, &caller, id)
                .await
                .map(Json)
        }

        /// Creates a record.
        #[utoipa::path(
            post,
            path = $collection,
            request_body = $create,
            responses(
                (status = 201, description = "Record created", body = $response),
                (status = 400, description = "Invalid request or unknown reference", body = ErrorResponse),
                (status = 403, description = "Role not allowed", body = ErrorResponse),
                (status = 409, description = "Duplicate unique key", body = ErrorResponse)
            ),
            security(("bearer_auth" = [])),
            tag = $tag
        )]
        pub async fn $post(
            State(state): State<Arc<AppState>>,
            caller: AuthUser,
            Json(request): Json<$create>,
        ) -> Result<(StatusCode, Json<$response>), ApiError> {
            let created = service::create::<$entity>(&state.store, &caller, request).await?;
            Ok((StatusCode::CREATED, Json(created)))
        }

        /// Replaces a record.
        #[utoipa::path(
            put,
            path = $item,
            params(("id" = Uuid, Path, description = "Record id")),
            request_body = $update,
            responses(
                (status = 200, description = "Record updated", body = $response),
                (status = 400, description = "Invalid request or unknown reference", body = ErrorResponse),
                (status = 403, description = "Role not allowed", body = ErrorResponse),
                (status = 404, description = "Record not found", body = ErrorResponse),
                (status = 409, description = "Duplicate key or stale row version", body = ErrorResponse)
            ),
            security(("bearer_auth" = [])),
            tag = $tag
        )]
        pub async fn $put(
            State(state): State<Arc<AppState>>,
            caller: AuthUser,
            Path(id): Path<Uuid>,
            Json(request): Json<$update>,
        ) -> Result<Json<$response>, ApiError> {
            service::update::<$entity>(&state.store, &caller, id, request)
                .await
                .map(Json)
        }

        /// Soft deletes a record. Deleting it again is a no-op.
        #[utoipa::path(
            delete,
            path = $item,
            params(("id" = Uuid, Path, description = "Record id")),
            responses(
                (status = 204, description = "Record deleted"),
                (status = 403, description = "Role not allowed", body = ErrorResponse),
                (status = 404, description = "Record never existed", body = ErrorResponse)
            ),
            security(("bearer_auth" = [])),
            tag = $tag
        )]
        pub async fn $delete(
            State(state): State<Arc<AppState>>,
            caller: AuthUser,
            Path(id): Path<Uuid>,
        ) -> Result<StatusCode, ApiError> {
            service::delete::<$entity>(&state.store, &caller, id).await?;
            Ok(StatusCode::NO_CONTENT)
        }
    };
}

// ============================================================================
// Health
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database_reachable = state.storage_reachable().await;
    Json(HealthResponse {
        status: if database_reachable { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.store.backend,
        database_reachable,
    })
}

// ============================================================================
// Authentication
// ============================================================================

/// Exchange credentials for an access token and a refresh token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = RateLimitErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientAddr(client): ClientAddr,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    service::login(&state, &client, request).await.map(Json)
}

/// Rotate a refresh token.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenResponse),
        (status = 401, description = "Unknown, expired or reused refresh token", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    service::refresh(&state, request).await.map(Json)
}

/// Revoke a refresh token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = RefreshRequest,
    responses(
        (status = 204, description = "Refresh token revoked")
    ),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<StatusCode, ApiError> {
    service::logout(&state, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Profile of the authenticated user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    service::me(&state, &caller).await.map(Json)
}

/// Change the caller's password. Ends every session of the caller.
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new password", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    service::change_password(&state, &caller, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reference Data
// ============================================================================

crud_handlers! {
    entity: Country,
    tag: "Countries",
    collection: "/api/countries",
    item: "/api/countries/{id}",
    create: CountryRequest,
    update: CountryRequest,
    response: CountryResponse,
    handlers: (list_countries, get_country, create_country, update_country, delete_country),
}

crud_handlers! {
    entity: Exchange,
    tag: "Exchanges",
    collection: "/api/exchanges",
    item: "/api/exchanges/{id}",
    create: ExchangeRequest,
    update: ExchangeRequest,
    response: ExchangeResponse,
    handlers: (list_exchanges, get_exchange, create_exchange, update_exchange, delete_exchange),
}

crud_handlers! {
    entity: Sector,
    tag: "Sectors",
    collection: "/api/sectors",
    item: "/api/sectors/{id}",
    create: SectorRequest,
    update: SectorRequest,
    response: SectorResponse,
    handlers: (list_sectors, get_sector, create_sector, update_sector, delete_sector),
}

crud_handlers! {
    entity: Industry,
    tag: "Industries",
    collection: "/api/industries",
    item: "/api/industries/{id}",
    create: IndustryRequest,
    update: IndustryRequest,
    response: IndustryResponse,
    handlers: (list_industries, get_industry, create_industry, update_industry, delete_industry),
}

crud_handlers! {
    entity: ClassificationTag,
    tag: "Classification Tags",
    collection: "/api/classification-tags",
    item: "/api/classification-tags/{id}",
    create: ClassificationTagRequest,
    update: ClassificationTagRequest,
    response: ClassificationTagResponse,
    handlers: (
        list_classification_tags,
        get_classification_tag,
        create_classification_tag,
        update_classification_tag,
        delete_classification_tag
    ),
}

crud_handlers! {
    entity: StockMarket,
    tag: "Stock Markets",
    collection: "/api/stock-markets",
    item: "/api/stock-markets/{id}",
    create: StockMarketRequest,
    update: StockMarketRequest,
    response: StockMarketResponse,
    handlers: (
        list_stock_markets,
        get_stock_market,
        create_stock_market,
        update_stock_market,
        delete_stock_market
    ),
}

crud_handlers! {
    entity: MarketCalendar,
    tag: "Market Calendars",
    collection: "/api/market-calendars",
    item: "/api/market-calendars/{id}",
    create: MarketCalendarRequest,
    update: MarketCalendarUpdateRequest,
    response: MarketCalendarResponse,
    handlers: (
        list_market_calendars,
        get_market_calendar,
        create_market_calendar,
        update_market_calendar,
        delete_market_calendar
    ),
}

// ============================================================================
// Quotes
// ============================================================================

crud_handlers! {
    entity: Quote,
    tag: "Quotes",
    collection: "/api/quotes",
    item: "/api/quotes/{id}",
    create: QuoteRequest,
    update: QuoteRequest,
    response: QuoteResponse,
    handlers: (list_quotes, get_quote, create_quote, update_quote, delete_quote),
}

/// A random active quote.
#[utoipa::path(
    get,
    path = "/api/quotes/random",
    responses(
        (status = 200, description = "Random quote", body = QuoteResponse),
        (status = 404, description = "No active quotes", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn random_quote(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<QuoteResponse>, ApiError> {
    service::random_quote(&state.store, &caller).await.map(Json)
}

/// The quote of the day. Stable for a given date.
#[utoipa::path(
    get,
    path = "/api/quotes/daily",
    params(DailyQuoteParams),
    responses(
        (status = 200, description = "Quote of the day", body = QuoteResponse),
        (status = 404, description = "No active quotes", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn daily_quote(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(params): Query<DailyQuoteParams>,
) -> Result<Json<QuoteResponse>, ApiError> {
    service::daily_quote(&state.store, &caller, params.date)
        .await
        .map(Json)
}

// ============================================================================
// Users
// ============================================================================

/// List users of the caller's tenant.
#[utoipa::path(
    get,
    path = "/api/users",
    params(ListParams),
    responses(
        (status = 200, description = "Page of users", body = PageResponse<UserResponse>),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse<UserResponse>>, ApiError> {
    service::list::<User>(&state.store, &caller, params)
        .await
        .map(Json)
}

/// Get a user.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    service::get::<User>(&state.store, &caller, id).await.map(Json)
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let created = service::create_user(&state.store, &caller, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a user.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    service::update_user(&state.store, &caller, id, request)
        .await
        .map(Json)
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete yourself", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "User never existed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service::delete_user(&state.store, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
