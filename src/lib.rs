//! # Reference Data Admin Backend - REST API Server
//!
//! A multi-tenant administration backend for market reference data:
//! countries, exchanges, sectors, industries, classification tags, stock
//! markets and market calendars, plus user administration and a small
//! catalogue of motivational quotes. Built with
//! [Axum](https://crates.io/crates/axum) for async HTTP handling and
//! provides OpenAPI/Swagger documentation via [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Uniform CRUD**: Every resource exposes list, get, create, replace and
//!   soft delete with the same paging, search and error conventions.
//!
//! - **Multi-Tenancy**: Every row belongs to the tenant of the user that
//!   created it; a tenant never sees another tenant's data.
//!
//! - **Auditing**: Rows carry creation, modification and deletion stamps and
//!   a row version. Market calendar updates are rejected when the row
//!   version the client read is stale.
//!
//! - **JWT Authentication**: Short-lived access tokens, rotating refresh
//!   tokens with reuse detection, and role based authorization.
//!
//! - **Pluggable Storage**: PostgreSQL through `sqlx` with embedded
//!   migrations, or an in-memory store when no database is configured.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers, extractors, router and OpenAPI document |
//! | [`auth`] | Roles, permissions, tokens, password hashing, login throttling |
//! | [`config`] | TOML configuration with environment overrides |
//! | [`db`] | Entities, repositories and their PostgreSQL / in-memory backends |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`models`] | Request/response DTOs with OpenAPI schemas and validation |
//! | [`service`] | Business rules between handlers and storage |
//! | [`state`] | Application state management |
//!
//! ## Roles
//!
//! | Permission | Master | Admin | Trader | Viewer |
//! |------------|--------|-------|--------|--------|
//! | Read reference data, calendars, quotes | ✓ | ✓ | ✓ | ✓ |
//! | Manage reference data | ✓ | ✓ | | |
//! | Manage market calendars | ✓ | ✓ | ✓ | |
//! | Manage quotes | ✓ | ✓ | | |
//! | Manage users | ✓ | ✓ | | |
//!
//! Only a Master user can create, modify or delete another Master user.
//!
//! ## API Endpoints
//!
//! ### Health & Authentication
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check (public) |
//! | POST | `/api/auth/login` | Exchange credentials for tokens |
//! | POST | `/api/auth/refresh` | Rotate a refresh token |
//! | POST | `/api/auth/logout` | Revoke a refresh token |
//! | GET | `/api/auth/me` | Current user |
//! | POST | `/api/auth/change-password` | Change own password |
//!
//! ### Resources
//!
//! `countries`, `exchanges`, `sectors`, `industries`, `classification-tags`,
//! `stock-markets`, `market-calendars`, `quotes` and `users` all follow:
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/{resource}` | Paged list (`page`, `per_page`, `search`, filters) |
//! | POST | `/api/{resource}` | Create |
//! | GET | `/api/{resource}/{id}` | Get one |
//! | PUT | `/api/{resource}/{id}` | Replace |
//! | DELETE | `/api/{resource}/{id}` | Soft delete |
//!
//! Quotes additionally serve `GET /api/quotes/random` and
//! `GET /api/quotes/daily?date=YYYY-MM-DD`.
//!
//! ## Example Usage
//!
//! ```bash
//! # Log in as the bootstrap master user
//! curl -X POST http://localhost:8080/api/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "master", "password": "ChangeMe123!"}'
//!
//! # Create a country
//! curl -X POST http://localhost:8080/api/countries \
//!   -H "Authorization: Bearer $TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "United States", "iso_code": "US", "currency_code": "USD"}'
//!
//! # Search exchanges of a country
//! curl "http://localhost:8080/api/exchanges?parent_id=$COUNTRY&search=nyse" \
//!   -H "Authorization: Bearer $TOKEN"
//! ```
//!
//! ## Swagger UI
//!
//! Once the server is running, access the interactive API documentation at:
//!
//! ```text
//! http://localhost:8080/swagger-ui/
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod state;
