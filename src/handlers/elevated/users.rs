// handlers/elevated/users.rs - account and role administration

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{register_user, users::hash_password};
use crate::state::AppState;
use crate::types::{Role, User};

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub role: Option<Role>,
    pub password: Option<String>,
}

/// GET /api/admin/users
pub async fn users_list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(state.store.list_users().await?))
}

/// POST /api/admin/users
pub async fn users_create(State(state): State<AppState>, Json(request): Json<CreateUser>) -> ApiResult<User> {
    let user = register_user(
        state.store.as_ref(),
        &state.config.security,
        &request.username,
        request.password,
        request.role,
    )
    .await?;
    Ok(ApiResponse::created(user))
}

/// PATCH /api/admin/users/:id - change role and/or reset password
///
/// Admins cannot demote themselves.
pub async fn user_patch(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<i64>,
    Json(update): Json<UpdateUser>,
) -> ApiResult<User> {
    if id == admin.id && update.role.is_some_and(|role| !role.is_admin()) {
        return Err(ApiError::invalid_field("role", "You cannot remove your own admin role"));
    }

    let password_hash = match update.password {
        Some(password) => Some(hash_password(password, state.config.security.bcrypt_cost).await?),
        None => None,
    };

    let user = state
        .store
        .update_user(id, update.role, password_hash.as_deref())
        .await?;
    tracing::info!(user_id = id, changed_by = %admin.username, "Updated account '{}'", user.username);
    Ok(ApiResponse::success(user))
}

/// DELETE /api/admin/users/:id
pub async fn user_delete(State(state): State<AppState>, admin: AuthUser, Path(id): Path<i64>) -> ApiResult<()> {
    if id == admin.id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    state.store.delete_user(id).await?;
    tracing::info!(user_id = id, deleted_by = %admin.username, "Account deleted");
    Ok(ApiResponse::no_content())
}
