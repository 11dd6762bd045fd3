//! Login, refresh token rotation and the caller's own account.

use crate::auth::{
    AuthUser, generate_refresh_token, hash_password_blocking, hash_token,
    verify_password_blocking,
};
use crate::db::{RefreshToken, User};
use crate::error::ApiError;
use crate::models::{
    ChangePasswordRequest, LoginRequest, RefreshRequest, TokenResponse, UserResponse, Validate,
};
use crate::state::AppState;
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "invalid username or password";
const INVALID_REFRESH: &str = "invalid refresh token";

/// Issues an access token and a fresh refresh token for `user`.
async fn issue_session(
    state: &AppState,
    user: User,
    now: DateTime<Utc>,
    token_id: Uuid,
) -> Result<TokenResponse, ApiError> {
    let access_token = state.tokens.issue_access_token(&user, now)?;
    let refresh_token = generate_refresh_token();
    let refresh_expires_at = state.tokens.refresh_expiry(now);

    state
        .store
        .credentials
        .insert_refresh_token(RefreshToken {
            id: token_id,
            user_id: user.meta.id,
            token_hash: hash_token(&refresh_token),
            issued_at: now,
            expires_at: refresh_expires_at,
            revoked_at: None,
            replaced_by: None,
        })
        .await?;

    Ok(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.access_ttl_secs(),
        refresh_token,
        refresh_expires_at,
        user: user.into(),
    })
}

/// Exchanges a username and password for tokens.
///
/// Attempts are limited per client address and username; a successful
/// login resets the count.
///
/// # Errors
/// Returns `RateLimitExceeded` when throttled and `Unauthorized` for bad
/// credentials or an inactive account.
#[instrument(skip_all, fields(client = %client, username = %request.username))]
pub async fn login(
    state: &AppState,
    client: &str,
    request: LoginRequest,
) -> Result<TokenResponse, ApiError> {
    request.validate()?;

    let limit = state.config.auth.login_attempts_per_minute;
    let throttle_key = format!("{}|{}", client, request.username.to_lowercase());
    if let Err(retry_after) = state.login_limiter.check_and_record(&throttle_key, limit) {
        warn!(retry_after, "login throttled");
        return Err(ApiError::RateLimitExceeded {
            limit,
            remaining: 0,
            reset: Utc::now().timestamp().max(0) as u64 + retry_after,
            retry_after,
        });
    }

    let Some(user) = state
        .store
        .credentials
        .find_user_by_username(request.username.trim())
        .await?
    else {
        warn!("login for unknown user");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let valid = verify_password_blocking(request.password, user.password_hash.clone()).await?;
    if !valid {
        warn!("login with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }
    if !user.is_active {
        warn!("login for inactive user");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    state.login_limiter.clear(&throttle_key);

    let now = Utc::now();
    state.store.credentials.record_login(user.meta.id, now).await?;
    let user = User {
        last_login_at: Some(now),
        ..user
    };

    info!(user_id = %user.meta.id, "login succeeded");
    issue_session(state, user, now, Uuid::new_v4()).await
}

/// Rotates a refresh token: the presented token is revoked and replaced.
///
/// Presenting a token that was already rotated or revoked is treated as
/// theft, and every refresh token of its owner is revoked.
///
/// # Errors
/// Returns `Unauthorized` for unknown, expired, reused or orphaned tokens.
#[instrument(skip_all)]
pub async fn refresh(state: &AppState, request: RefreshRequest) -> Result<TokenResponse, ApiError> {
    let credentials = &state.store.credentials;
    let now = Utc::now();

    let Some(token) = credentials
        .find_refresh_token(&hash_token(request.refresh_token.trim()))
        .await?
    else {
        warn!("unknown refresh token");
        return Err(ApiError::Unauthorized(INVALID_REFRESH.to_string()));
    };

    if token.revoked_at.is_some() {
        let revoked = credentials.revoke_user_tokens(token.user_id, now).await?;
        warn!(user_id = %token.user_id, revoked, "refresh token reuse detected");
        return Err(ApiError::Unauthorized(INVALID_REFRESH.to_string()));
    }
    if !token.is_usable(now) {
        return Err(ApiError::Unauthorized("refresh token expired".to_string()));
    }

    let user = match credentials.find_user(token.user_id).await? {
        Some(user) if user.is_active => user,
        _ => {
            credentials.revoke_refresh_token(token.id, None, now).await?;
            warn!(user_id = %token.user_id, "refresh for inactive or deleted user");
            return Err(ApiError::Unauthorized(INVALID_REFRESH.to_string()));
        }
    };

    let replacement_id = Uuid::new_v4();
    if !credentials
        .revoke_refresh_token(token.id, Some(replacement_id), now)
        .await?
    {
        // Lost a race against another rotation of the same token.
        let revoked = credentials.revoke_user_tokens(token.user_id, now).await?;
        warn!(user_id = %token.user_id, revoked, "concurrent refresh token reuse");
        return Err(ApiError::Unauthorized(INVALID_REFRESH.to_string()));
    }

    info!(user_id = %user.meta.id, "refresh token rotated");
    issue_session(state, user, now, replacement_id).await
}

/// Revokes the presented refresh token. Unknown or already revoked tokens
/// are ignored.
///
/// # Errors
/// Returns an error only when storage fails.
#[instrument(skip_all)]
pub async fn logout(state: &AppState, request: RefreshRequest) -> Result<(), ApiError> {
    let credentials = &state.store.credentials;
    if let Some(token) = credentials
        .find_refresh_token(&hash_token(request.refresh_token.trim()))
        .await?
        && token.revoked_at.is_none()
    {
        credentials
            .revoke_refresh_token(token.id, None, Utc::now())
            .await?;
        info!(user_id = %token.user_id, "logged out");
    }
    Ok(())
}

async fn current_user(state: &AppState, caller: &AuthUser) -> Result<User, ApiError> {
    match state.store.credentials.find_user(caller.user_id).await? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(ApiError::Unauthorized(
            "account is no longer active".to_string(),
        )),
    }
}

/// The caller's own profile.
///
/// # Errors
/// Returns `Unauthorized` when the account was deleted or deactivated after
/// the token was issued.
pub async fn me(state: &AppState, caller: &AuthUser) -> Result<UserResponse, ApiError> {
    current_user(state, caller).await.map(UserResponse::from)
}

/// Changes the caller's password and ends all of their sessions.
///
/// # Errors
/// Returns `InvalidRequest` when the current password is wrong or the new
/// one is unacceptable.
#[instrument(skip_all, fields(user_id = %caller.user_id))]
pub async fn change_password(
    state: &AppState,
    caller: &AuthUser,
    request: ChangePasswordRequest,
) -> Result<(), ApiError> {
    request.validate()?;
    let user = current_user(state, caller).await?;

    let valid = verify_password_blocking(request.current_password, user.password_hash).await?;
    if !valid {
        warn!("password change with wrong current password");
        return Err(ApiError::InvalidRequest(
            "current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password_blocking(request.new_password).await?;
    let now = Utc::now();
    let credentials = &state.store.credentials;
    credentials
        .set_password_hash(user.meta.id, &password_hash, user.meta.id, now)
        .await?;
    let revoked = credentials.revoke_user_tokens(user.meta.id, now).await?;

    info!(revoked, "password changed");
    Ok(())
}
