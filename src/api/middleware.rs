//! Request extractors for authentication and client identification.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Scheme prefix of the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

/// Address used to throttle a client.
///
/// Forwarded headers are consulted only when `trust_forwarded` is set;
/// otherwise the peer address of the connection is used.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    if trust_forwarded {
        if let Some(forwarded) = headers.get("X-Forwarded-For")
            && let Ok(value) = forwarded.to_str()
            && let Some(ip) = value.split(',').next()
            && !ip.trim().is_empty()
        {
            return ip.trim().to_string();
        }

        if let Some(real_ip) = headers.get("X-Real-IP")
            && let Ok(value) = real_ip.to_str()
            && !value.trim().is_empty()
        {
            return value.trim().to_string();
        }
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

/// Client address of the request, as used for login throttling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl FromRequestParts<Arc<AppState>> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        Ok(ClientAddr(client_ip(
            &parts.headers,
            peer,
            state.config.server.trust_forwarded_headers,
        )))
    }
}

/// Bearer token of the request, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

/// Authenticates the caller from the bearer access token. Rejects with
/// 401 when the header is missing or the token does not verify.
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(ApiError::Unauthorized(
                "missing bearer token".to_string(),
            ));
        };

        let claims = state.tokens.verify(token).inspect_err(|err| {
            debug!(error = %err, path = %parts.uri.path(), "rejected access token");
        })?;
        Ok(AuthUser::from(claims))
    }
}
