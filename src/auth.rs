//! Authentication primitives: roles, access tokens, password hashing,
//! refresh token material and login throttling.

use crate::config::AuthConfig;
use crate::db::User;
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use utoipa::ToSchema;
use uuid::Uuid;

/// Prefix for refresh tokens.
const REFRESH_TOKEN_PREFIX: &str = "rt_";

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token could not be decoded or failed validation.
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// Token signature is valid but the token expired.
    #[error("token expired")]
    ExpiredToken,
    /// Token could not be signed.
    #[error("failed to create token: {0}")]
    TokenCreation(String),
    /// Password hashing or hash parsing failed.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

// ============================================================================
// Roles and Permissions
// ============================================================================

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Unrestricted, including management of other Master users.
    Master,
    /// Tenant administrator.
    Admin,
    /// Reads reference data and maintains market calendars.
    Trader,
    /// Read only.
    Viewer,
}

/// Operations guarded by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read reference data, calendars and quotes.
    Read,
    /// Create, update and delete reference data.
    ManageReferenceData,
    /// Create, update and delete market calendar entries.
    ManageCalendars,
    /// Create, update and delete quotes.
    ManageQuotes,
    /// Create, update and delete users.
    ManageUsers,
}

impl Role {
    /// All roles, most privileged first.
    pub const ALL: [Role; 4] = [Role::Master, Role::Admin, Role::Trader, Role::Viewer];

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Admin => "admin",
            Role::Trader => "trader",
            Role::Viewer => "viewer",
        }
    }

    /// Check if this role grants the given permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            Role::Master | Role::Admin => true,
            Role::Trader => matches!(permission, Permission::Read | Permission::ManageCalendars),
            Role::Viewer => permission == Permission::Read,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored role name is unknown.
#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "master" => Ok(Role::Master),
            "admin" => Ok(Role::Admin),
            "trader" => Ok(Role::Trader),
            "viewer" => Ok(Role::Viewer),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Access Tokens
// ============================================================================

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    /// Tenant the user belongs to.
    pub tenant: Uuid,
    /// Role at issuance time.
    pub role: Role,
    /// Username at issuance time.
    pub username: String,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// User id.
    pub user_id: Uuid,
    /// Tenant every read and write is scoped to.
    pub tenant_id: Uuid,
    /// Role.
    pub role: Role,
    /// Username.
    pub username: String,
}

impl AuthUser {
    /// Fails with `Forbidden` unless the caller's role grants `permission`.
    ///
    /// # Errors
    /// Returns `ApiError::Forbidden` when the permission is missing.
    pub fn require(&self, permission: Permission) -> Result<(), crate::error::ApiError> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            Err(crate::error::ApiError::Forbidden(format!(
                "role {} lacks permission {:?}",
                self.role, permission
            )))
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            tenant_id: claims.tenant,
            role: claims.role,
            username: claims.username,
        }
    }
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            access_ttl: Duration::seconds(config.access_token_ttl_secs as i64),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_secs as i64),
        }
    }

    /// Access token lifetime in seconds.
    #[must_use]
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Expiry of a refresh token issued at `now`.
    #[must_use]
    pub fn refresh_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.refresh_ttl
    }

    /// Issues an access token for `user`.
    ///
    /// # Errors
    /// Returns `AuthError::TokenCreation` if signing fails.
    pub fn issue_access_token(&self, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.meta.id,
            tenant: user.meta.tenant_id,
            role: user.role,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            iss: self.issuer.clone(),
        };
        self.encode(&claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verifies signature, issuer and expiry of an access token.
    ///
    /// # Errors
    /// Returns `AuthError::ExpiredToken` or `AuthError::InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.leeway = 5;

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

// ============================================================================
// Refresh Tokens
// ============================================================================

/// Generates a new opaque refresh token. Only its hash is ever stored.
#[must_use]
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut token = String::with_capacity(REFRESH_TOKEN_PREFIX.len() + bytes.len() * 2);
    token.push_str(REFRESH_TOKEN_PREFIX);
    for byte in bytes {
        token.push_str(&format!("{byte:02x}"));
    }
    token
}

/// Hash a refresh token for storage and lookup.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// Passwords
// ============================================================================

/// Hashes a password into an argon2 PHC string.
///
/// # Errors
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Checks a password against a stored PHC string.
///
/// # Errors
/// Returns `AuthError::PasswordHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Runs [`hash_password`] on the blocking pool.
///
/// # Errors
/// Returns `AuthError::PasswordHash` if hashing fails or the task panics.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

/// Runs [`verify_password`] on the blocking pool.
///
/// # Errors
/// Returns `AuthError::PasswordHash` if the hash is unparsable or the task panics.
pub async fn verify_password_blocking(
    password: String,
    stored_hash: String,
) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

// ============================================================================
// Login Throttling
// ============================================================================

/// Calls to [`RateLimiter::check_and_record`] between sweeps of idle keys.
const SWEEP_INTERVAL: u64 = 256;

/// Rate limiter using sliding window algorithm.
#[derive(Debug)]
pub struct RateLimiter {
    /// Request timestamps per key.
    windows: DashMap<String, VecDeque<u64>>,
    /// Window length in milliseconds.
    window_ms: u64,
    /// Calls since creation, used to schedule sweeps.
    calls: AtomicU64,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(60_000)
    }
}

impl RateLimiter {
    /// Create a new rate limiter with the given window length.
    #[must_use]
    pub fn new(window_ms: u64) -> Self {
        Self {
            windows: DashMap::new(),
            window_ms,
            calls: AtomicU64::new(0),
        }
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// Records a request for `key` if it is under `limit`.
    ///
    /// Returns the number of requests still allowed in the window, or the
    /// seconds until the oldest request leaves the window when limited.
    pub fn check_and_record(&self, key: &str, limit: u32) -> Result<u32, u64> {
        self.check_and_record_at(key, limit, Self::now_ms())
    }

    fn check_and_record_at(&self, key: &str, limit: u32, now: u64) -> Result<u32, u64> {
        if (self.calls.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_INTERVAL == 0 {
            self.sweep_at(now);
        }

        let window_start = now.saturating_sub(self.window_ms);
        let mut entry = self.windows.entry(key.to_string()).or_default();
        let window = entry.value_mut();

        while let Some(&front) = window.front() {
            if front < window_start {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() < limit as usize {
            window.push_back(now);
            Ok(limit - window.len() as u32)
        } else {
            let oldest = window.front().copied().unwrap_or(now);
            let retry_ms = (oldest + self.window_ms).saturating_sub(now);
            Err(retry_ms.div_ceil(1000).max(1))
        }
    }

    /// Drops every key without a request inside the current window.
    pub fn sweep(&self) {
        self.sweep_at(Self::now_ms());
    }

    fn sweep_at(&self, now: u64) {
        let window_start = now.saturating_sub(self.window_ms);
        self.windows
            .retain(|_, window| window.back().is_some_and(|&last| last >= window_start));
    }

    /// Number of tracked keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no key is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Clear rate limit data for a key.
    pub fn clear(&self, key: &str) {
        self.windows.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::AuditMeta;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            issuer: "refdata-test".to_string(),
            access_token_ttl_secs: 900,
            refresh_token_ttl_secs: 3600,
            login_attempts_per_minute: 5,
        }
    }

    fn test_user(role: Role) -> User {
        User {
            meta: AuditMeta::new(Uuid::new_v4(), Uuid::nil(), Utc::now()),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            display_name: None,
            role,
            password_hash: String::new(),
            is_active: true,
            last_login_at: None,
        }
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Master.has_permission(Permission::ManageUsers));
        assert!(Role::Admin.has_permission(Permission::ManageReferenceData));
        assert!(Role::Trader.has_permission(Permission::ManageCalendars));
        assert!(!Role::Trader.has_permission(Permission::ManageReferenceData));
        assert!(!Role::Trader.has_permission(Permission::ManageUsers));
        assert!(Role::Viewer.has_permission(Permission::Read));
        assert!(!Role::Viewer.has_permission(Permission::ManageCalendars));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::try_from("viewer".to_string()).unwrap(), Role::Viewer);
        assert!("root".parse::<Role>().is_err());
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Trader).unwrap(), "\"trader\"");
    }

    #[test]
    fn test_auth_user_require() {
        let viewer = AuthUser {
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            role: Role::Viewer,
            username: "v".to_string(),
        };
        assert!(viewer.require(Permission::Read).is_ok());
        assert!(viewer.require(Permission::ManageQuotes).is_err());
    }

    #[test]
    fn test_issue_and_verify_token() {
        let issuer = TokenIssuer::new(&test_config());
        let user = test_user(Role::Trader);

        let token = issuer.issue_access_token(&user, Utc::now()).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, user.meta.id);
        assert_eq!(claims.tenant, user.meta.tenant_id);
        assert_eq!(claims.role, Role::Trader);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        let user = test_user(Role::Viewer);

        let token = issuer
            .issue_access_token(&user, Utc::now() - Duration::hours(2))
            .unwrap();

        assert!(matches!(issuer.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        let mut other_config = test_config();
        other_config.jwt_secret = "ffffffffffffffffffffffffffffffff".to_string();
        let other = TokenIssuer::new(&other_config);

        let token = other
            .issue_access_token(&test_user(Role::Admin), Utc::now())
            .unwrap();

        assert!(matches!(
            issuer.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_with_wrong_issuer_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            tenant: Uuid::new_v4(),
            role: Role::Admin,
            username: "mallory".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
            iss: "someone-else".to_string(),
        };
        let token = issuer.encode(&claims).unwrap();

        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        assert!(matches!(
            issuer.verify("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_refresh_token_generation() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert!(a.starts_with(REFRESH_TOKEN_PREFIX));
        assert_eq!(a.len(), REFRESH_TOKEN_PREFIX.len() + 64);
        assert!(a[REFRESH_TOKEN_PREFIX.len()..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), hash_token(&b));
        assert_eq!(hash_token(&a).len(), 64);
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::PasswordHash(_))
        ));
    }

    #[tokio::test]
    async fn test_blocking_password_helpers() {
        let hash = hash_password_blocking("s3cret-pass".to_string())
            .await
            .unwrap();
        assert!(
            verify_password_blocking("s3cret-pass".to_string(), hash)
                .await
                .unwrap()
        );
    }

    #[test]
    fn test_rate_limiter() {
        let limiter = RateLimiter::default();

        for expected_remaining in (0..5).rev() {
            assert_eq!(limiter.check_and_record("10.0.0.1", 5), Ok(expected_remaining));
        }

        let retry_after = limiter.check_and_record("10.0.0.1", 5).unwrap_err();
        assert!(retry_after >= 1 && retry_after <= 60);
    }

    #[test]
    fn test_rate_limiter_different_keys() {
        let limiter = RateLimiter::default();

        for _ in 0..3 {
            assert!(limiter.check_and_record("key1", 3).is_ok());
        }
        assert!(limiter.check_and_record("key1", 3).is_err());
        assert!(limiter.check_and_record("key2", 3).is_ok());

        limiter.clear("key1");
        assert!(limiter.check_and_record("key1", 3).is_ok());
    }

    #[test]
    fn test_rate_limiter_window_expires() {
        let limiter = RateLimiter::new(20);

        assert!(limiter.check_and_record("k", 1).is_ok());
        assert!(limiter.check_and_record("k", 1).is_err());
        std::thread::sleep(std::time::Duration::from_millis(40));
        assert!(limiter.check_and_record("k", 1).is_ok());
    }

    #[test]
    fn test_rate_limiter_sweeps_idle_keys() {
        let limiter = RateLimiter::new(1_000);

        for i in 0..200 {
            let _ = limiter.check_and_record_at(&format!("10.0.0.1|user{i}"), 5, 0);
        }
        assert_eq!(limiter.len(), 200);

        // The 256th call lands inside this batch and sweeps the idle keys.
        for _ in 0..SWEEP_INTERVAL {
            let _ = limiter.check_and_record_at("10.0.0.2|master", 5, 10_000);
        }
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_rate_limiter_sweep_keeps_active_keys() {
        let limiter = RateLimiter::new(1_000);
        assert!(limiter.is_empty());

        assert!(limiter.check_and_record_at("old", 5, 0).is_ok());
        assert!(limiter.check_and_record_at("recent", 5, 5_000).is_ok());
        limiter.sweep_at(5_500);

        assert_eq!(limiter.len(), 1);
        assert_eq!(limiter.check_and_record_at("recent", 5, 5_600), Ok(3));
    }
}
