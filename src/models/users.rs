//! User management and session payloads.

use super::reference::default_active;
use super::validation::{Validate, ValidationError, email, optional, password, username};
use crate::auth::Role;
use crate::db::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

/// Body of `POST /api/users`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    /// Login name, unique across tenants.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Name shown in the UI.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Role.
    pub role: Role,
    /// Initial password.
    pub password: String,
    /// Defaults to `true`.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        username("username", &self.username)?;
        email("email", &self.email)?;
        optional("display_name", self.display_name.as_deref(), 128)?;
        password("password", &self.password)
    }
}

/// Body of `PUT /api/users/{id}`. Omitting `password` keeps the current one.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Login name, unique across tenants.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Name shown in the UI.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Role.
    pub role: Role,
    /// Inactive users cannot sign in.
    pub is_active: bool,
    /// New password, set by an administrator.
    #[serde(default)]
    pub password: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        username("username", &self.username)?;
        email("email", &self.email)?;
        optional("display_name", self.display_name.as_deref(), 128)?;
        if let Some(new_password) = &self.password {
            password("password", new_password)?;
        }
        Ok(())
    }
}

/// A user. The password hash is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// User id.
    pub id: Uuid,
    /// Tenant the user belongs to.
    pub tenant_id: Uuid,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Name shown in the UI.
    pub display_name: Option<String>,
    /// Role.
    pub role: Role,
    /// Whether the user can sign in.
    pub is_active: bool,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Row version.
    pub row_version: i64,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.meta.id,
            tenant_id: u.meta.tenant_id,
            username: u.username,
            email: u.email,
            display_name: u.display_name,
            role: u.role,
            is_active: u.is_active,
            last_login_at: u.last_login_at,
            created_at: u.meta.created_at,
            updated_at: u.meta.updated_at,
            row_version: u.meta.row_version,
        }
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Body of `POST /api/auth/login`.
#[derive(Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::Required { field: "username" });
        }
        if self.password.is_empty() {
            return Err(ValidationError::Required { field: "password" });
        }
        Ok(())
    }
}

/// Body of `POST /api/auth/refresh` and `POST /api/auth/logout`.
#[derive(Clone, Deserialize, Serialize, ToSchema)]
pub struct RefreshRequest {
    /// Refresh token returned by login or the previous refresh.
    pub refresh_token: String,
}

impl std::fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRequest").finish_non_exhaustive()
    }
}

/// Issued credentials.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Bearer token for the `Authorization` header.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Single-use token for `POST /api/auth/refresh`.
    pub refresh_token: String,
    /// Refresh token expiry.
    pub refresh_expires_at: DateTime<Utc>,
    /// The signed-in user.
    pub user: UserResponse,
}

/// Body of `POST /api/auth/change-password`.
#[derive(Clone, Deserialize, Serialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// Replacement password.
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest").finish_non_exhaustive()
    }
}

impl Validate for ChangePasswordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.current_password.is_empty() {
            return Err(ValidationError::Required {
                field: "current_password",
            });
        }
        password("new_password", &self.new_password)?;
        if self.current_password == self.new_password {
            return Err(ValidationError::Rule(
                "new_password must differ from current_password".to_string(),
            ));
        }
        Ok(())
    }
}
