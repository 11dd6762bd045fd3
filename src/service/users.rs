//! User management on top of the generic flow.

use super::{ensure_unique, load};
use crate::auth::{AuthUser, Permission, Role, hash_password_blocking};
use crate::db::{AuditMeta, Store, User};
use crate::error::ApiError;
use crate::models::{CreateUserRequest, UpdateUserRequest, UserResponse, Validate, trimmed_opt};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Only a Master may create, modify, delete or promote to a Master user.
fn guard_master(caller: &AuthUser, roles: &[Role]) -> Result<(), ApiError> {
    if caller.role != Role::Master && roles.contains(&Role::Master) {
        return Err(ApiError::Forbidden(
            "only a master user can manage master users".to_string(),
        ));
    }
    Ok(())
}

/// Creates a user in the caller's tenant.
///
/// # Errors
/// Returns `Forbidden`, `InvalidRequest`, or `Duplicate` when the username
/// is taken in any tenant.
#[instrument(skip_all, fields(tenant = %caller.tenant_id, username = %request.username))]
pub async fn create_user(
    store: &Store,
    caller: &AuthUser,
    request: CreateUserRequest,
) -> Result<UserResponse, ApiError> {
    caller.require(Permission::ManageUsers)?;
    request.validate()?;
    guard_master(caller, &[request.role])?;

    let password_hash = hash_password_blocking(request.password).await?;
    let user = User {
        meta: AuditMeta::new(caller.tenant_id, caller.user_id, Utc::now()),
        username: request.username,
        email: request.email.trim().to_string(),
        display_name: trimmed_opt(request.display_name.as_deref()),
        role: request.role,
        password_hash,
        is_active: request.is_active,
        last_login_at: None,
    };
    ensure_unique(store.users.as_ref(), &user).await?;

    let created = store.users.insert(user).await?;
    info!(id = %created.meta.id, role = %created.role, "user created");
    Ok(created.into())
}

/// Replaces a user's profile, role and status, and optionally resets the
/// password. Password resets and deactivation end the user's sessions.
///
/// # Errors
/// Returns `Forbidden`, `InvalidRequest`, `NotFound` or `Duplicate`.
#[instrument(skip_all, fields(tenant = %caller.tenant_id, id = %id))]
pub async fn update_user(
    store: &Store,
    caller: &AuthUser,
    id: Uuid,
    request: UpdateUserRequest,
) -> Result<UserResponse, ApiError> {
    caller.require(Permission::ManageUsers)?;
    request.validate()?;

    let mut user = load::<User>(store, caller.tenant_id, id).await?;
    guard_master(caller, &[user.role, request.role])?;
    if id == caller.user_id && (request.role != user.role || !request.is_active) {
        return Err(ApiError::InvalidRequest(
            "you cannot change your own role or deactivate yourself".to_string(),
        ));
    }

    let deactivated = user.is_active && !request.is_active;
    let new_password_hash = match request.password {
        Some(password) => Some(hash_password_blocking(password).await?),
        None => None,
    };
    user.username = request.username;
    user.email = request.email.trim().to_string();
    user.display_name = trimmed_opt(request.display_name.as_deref());
    user.role = request.role;
    user.is_active = request.is_active;

    let now = Utc::now();
    user.meta.touch(caller.user_id, now);
    ensure_unique(store.users.as_ref(), &user).await?;

    let updated = store.users.update(user, None).await?;
    if let Some(password_hash) = &new_password_hash {
        store
            .credentials
            .set_password_hash(id, password_hash, caller.user_id, now)
            .await?;
    }
    if new_password_hash.is_some() || deactivated {
        let revoked = store.credentials.revoke_user_tokens(id, now).await?;
        info!(revoked, "user sessions revoked");
    }
    info!(role = %updated.role, active = updated.is_active, "user updated");
    Ok(updated.into())
}

/// Soft deletes a user and revokes their sessions.
///
/// # Errors
/// Returns `Forbidden`, `InvalidRequest` when deleting oneself, or `NotFound`.
#[instrument(skip_all, fields(tenant = %caller.tenant_id, id = %id))]
pub async fn delete_user(store: &Store, caller: &AuthUser, id: Uuid) -> Result<(), ApiError> {
    caller.require(Permission::ManageUsers)?;
    if id == caller.user_id {
        return Err(ApiError::InvalidRequest(
            "you cannot delete yourself".to_string(),
        ));
    }

    if let Some(target) = store.users.get(caller.tenant_id, id).await? {
        guard_master(caller, &[target.role])?;
    }

    let now = Utc::now();
    let deleted = store
        .users
        .soft_delete(caller.tenant_id, id, caller.user_id, now)
        .await?;
    if deleted {
        store.credentials.revoke_user_tokens(id, now).await?;
        info!("user deleted");
    }
    Ok(())
}
