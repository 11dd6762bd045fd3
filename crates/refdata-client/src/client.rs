//! HTTP client for the reference data API.

use crate::error::Error;
use crate::resources::Resource;
use crate::types::*;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Reference Data Admin API.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RefDataClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RefDataClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        url::Url::parse(&config.base_url)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// A copy of this client sending `token` as bearer credentials.
    #[must_use]
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..self.clone()
        }
    }

    /// The bearer token in use.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Typed access to one resource collection.
    #[must_use]
    pub fn resource<R: Resource>(&self) -> ResourceClient<'_, R> {
        ResourceClient {
            client: self,
            _resource: PhantomData,
        }
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let resp = self.client.get(self.url("/health")).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Logs in and returns the token pair.
    ///
    /// # Errors
    /// Returns `Unauthorized` for bad credentials and `Api` with status 429
    /// when throttled.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, Error> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// # Errors
    /// Returns `Unauthorized` for unknown, expired or reused tokens.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let resp = self
            .client
            .post(self.url("/api/auth/refresh"))
            .json(&body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Revokes a refresh token.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), Error> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let resp = self
            .client
            .post(self.url("/api/auth/logout"))
            .json(&body)
            .send()
            .await?;
        self.handle_empty_response(resp).await
    }

    /// Profile of the authenticated user.
    ///
    /// # Errors
    /// Returns `Unauthorized` without a valid token.
    pub async fn me(&self) -> Result<UserResponse, Error> {
        let resp = self
            .authorized(self.client.get(self.url("/api/auth/me")))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Changes the caller's password. Every refresh token of the caller is
    /// revoked.
    ///
    /// # Errors
    /// Returns `Api` with status 400 when the current password is wrong.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), Error> {
        let body = ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        let resp = self
            .authorized(self.client.post(self.url("/api/auth/change-password")))
            .json(&body)
            .send()
            .await?;
        self.handle_empty_response(resp).await
    }

    // ========================================================================
    // Quotes
    // ========================================================================

    /// A random active quote.
    ///
    /// # Errors
    /// Returns `NotFound` when there is no active quote.
    pub async fn random_quote(&self) -> Result<QuoteResponse, Error> {
        let resp = self
            .authorized(self.client.get(self.url("/api/quotes/random")))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// The quote of `date`, or of today.
    ///
    /// # Errors
    /// Returns `NotFound` when there is no active quote.
    pub async fn daily_quote(&self, date: Option<NaiveDate>) -> Result<QuoteResponse, Error> {
        let url = self.url_with_query("/api/quotes/daily", &DailyQuoteQuery { date })?;
        let resp = self.authorized(self.client.get(url)).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn url_with_query<Q: Serialize>(&self, path: &str, query: &Q) -> Result<String, Error> {
        let mut url = self.url(path);
        let params = serde_urlencoded::to_string(query)?;
        if !params.is_empty() {
            url.push_str(&format!("?{}", params));
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Maps an error response to [`Error`], keeping the server's code.
    async fn error_from(resp: reqwest::Response) -> Error {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.code, body.error),
            Err(_) => (String::new(), text),
        };

        match status {
            404 => Error::NotFound(message),
            401 => Error::Unauthorized(message),
            _ => Error::Api {
                status,
                code,
                message,
            },
        }
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(Self::error_from(resp).await)
        }
    }

    async fn handle_empty_response(&self, resp: reqwest::Response) -> Result<(), Error> {
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(resp).await)
        }
    }
}

/// CRUD operations on one resource collection.
#[derive(Debug)]
pub struct ResourceClient<'a, R> {
    client: &'a RefDataClient,
    _resource: PhantomData<R>,
}

impl<R: Resource> ResourceClient<'_, R> {
    fn collection(&self) -> String {
        self.client.url(&format!("/api/{}", R::PATH))
    }

    fn item(&self, id: Uuid) -> String {
        self.client.url(&format!("/api/{}/{}", R::PATH, id))
    }

    /// Lists one page of live records.
    ///
    /// # Errors
    /// Returns `Api` with status 400 for bad paging or filters.
    pub async fn list(&self, params: &ListParams) -> Result<Page<R::Item>, Error> {
        let url = self
            .client
            .url_with_query(&format!("/api/{}", R::PATH), params)?;
        let resp = self.client.authorized(self.client.client.get(url)).send().await?;
        self.client.handle_response(resp).await
    }

    /// Gets one record.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown or deleted records.
    pub async fn get(&self, id: Uuid) -> Result<R::Item, Error> {
        let resp = self
            .client
            .authorized(self.client.client.get(self.item(id)))
            .send()
            .await?;
        self.client.handle_response(resp).await
    }

    /// Creates a record.
    ///
    /// # Errors
    /// Returns `Api` with status 400, 403 or 409.
    pub async fn create(&self, body: &R::Create) -> Result<R::Item, Error> {
        let resp = self
            .client
            .authorized(self.client.client.post(self.collection()))
            .json(body)
            .send()
            .await?;
        self.client.handle_response(resp).await
    }

    /// Replaces a record.
    ///
    /// # Errors
    /// Returns `NotFound`, or `Api` with status 400, 403 or 409.
    pub async fn update(&self, id: Uuid, body: &R::Update) -> Result<R::Item, Error> {
        let resp = self
            .client
            .authorized(self.client.client.put(self.item(id)))
            .json(body)
            .send()
            .await?;
        self.client.handle_response(resp).await
    }

    /// Soft deletes a record.
    ///
    /// # Errors
    /// Returns `NotFound` when the record never existed.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let resp = self
            .client
            .authorized(self.client.client.delete(self.item(id)))
            .send()
            .await?;
        self.client.handle_empty_response(resp).await
    }
}
