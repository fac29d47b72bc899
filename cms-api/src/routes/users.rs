/// User management endpoints
///
/// Any authenticated user can list and read users; changes require the
/// `admin` role. Responses never include password hashes.
///
/// # Endpoints
///
/// - `GET /api/users` - List users
/// - `POST /api/users` - Create user (admin)
/// - `GET /api/users/:id` - Get user
/// - `PUT /api/users/:id` - Update user (admin)
/// - `DELETE /api/users/:id` - Delete user (admin)
/// - `PATCH /api/users/:id/status` - Change status (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
    routes::auth::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cms_shared::{
    auth::{authorization::require_admin, middleware::AuthContext, password},
    models::{
        next_id,
        user::{
            ensure_admin_remains, ensure_unique, find_by_id, CreateUser, PublicUser, Role,
            UpdateUser, UpdateUserStatus, User, UserError,
        },
    },
    store::Collection,
};
use serde::Serialize;
use tracing::info;
use validator::Validate;

/// Response carrying a single user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Lists every user
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users: Vec<User> = state.store.read_as(Collection::Users).await?;
    Ok(Json(users.iter().map(User::public).collect()))
}

/// Gets one user
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    let users: Vec<User> = state.store.read_as(Collection::Users).await?;

    find_by_id(&users, &id)
        .map(|u| Json(u.public()))
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Creates a user
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or username/email already taken
/// - `403 Forbidden`: Caller is not an admin
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateUser>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    require_admin(&auth)?;
    req.validate()?;

    let hash =
        password::hash_password_blocking(req.password.clone(), *state.config.password_params()).await?;

    let user = state
        .store
        .update(Collection::Users, |users: &mut Vec<User>| {
            ensure_unique(users, Some(&req.username), Some(&req.email), None)?;

            let user = User::new(
                next_id(users.iter().map(|u| u.id.as_str())),
                req.username,
                req.email,
                hash,
                req.role.unwrap_or(Role::Editor),
                req.status.unwrap_or_default(),
            );
            let public = user.public();
            users.push(user);

            Ok::<_, ApiError>(public)
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, role = %user.role, created_by = %auth.user.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// Updates a user
///
/// A new password is hashed before storing. Demoting or deactivating the
/// last active administrator is rejected.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUser>,
) -> ApiResult<Json<UserResponse>> {
    require_admin(&auth)?;
    req.validate()?;

    let hash = match req.password.clone() {
        Some(p) => Some(password::hash_password_blocking(p, *state.config.password_params()).await?),
        None => None,
    };

    let user = state
        .store
        .update(Collection::Users, |users: &mut Vec<User>| {
            let index = users
                .iter()
                .position(|u| u.id == id)
                .ok_or_else(|| UserError::NotFound(id.clone()))?;

            ensure_unique(users, req.username.as_deref(), req.email.as_deref(), Some(&id))?;

            let mut updated = users[index].clone();
            updated.apply(req, hash);

            if users[index].is_active_admin() {
                ensure_admin_remains(users, &id, Some(&updated))?;
            }

            let public = updated.public();
            users[index] = updated;
            Ok::<_, ApiError>(public)
        })
        .await?;

    info!(user_id = %user.id, updated_by = %auth.user.id, "User updated");

    Ok(Json(UserResponse {
        message: "User updated successfully".to_string(),
        user,
    }))
}

/// Deletes a user
///
/// # Errors
///
/// - `400 Bad Request`: Deleting oneself or the last active administrator
/// - `404 Not Found`: No such user
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&auth)?;

    if auth.user.id == id {
        return Err(UserError::SelfDeletion.into());
    }

    state
        .store
        .update(Collection::Users, |users: &mut Vec<User>| {
            let index = users
                .iter()
                .position(|u| u.id == id)
                .ok_or_else(|| UserError::NotFound(id.clone()))?;

            if users[index].is_active_admin() {
                ensure_admin_remains(users, &id, None)?;
            }

            users.remove(index);
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(user_id = %id, deleted_by = %auth.user.id, "User deleted");

    Ok(MessageResponse::new("User deleted successfully"))
}

/// Changes a user's status
pub async fn update_user_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserStatus>,
) -> ApiResult<Json<UserResponse>> {
    require_admin(&auth)?;

    let update = UpdateUser {
        status: Some(req.status),
        ..Default::default()
    };

    let user = state
        .store
        .update(Collection::Users, |users: &mut Vec<User>| {
            let index = users
                .iter()
                .position(|u| u.id == id)
                .ok_or_else(|| UserError::NotFound(id.clone()))?;

            let mut updated = users[index].clone();
            updated.apply(update, None);

            if users[index].is_active_admin() {
                ensure_admin_remains(users, &id, Some(&updated))?;
            }

            let public = updated.public();
            users[index] = updated;
            Ok::<_, ApiError>(public)
        })
        .await?;

    info!(user_id = %user.id, status = %user.status, updated_by = %auth.user.id, "User status changed");

    Ok(Json(UserResponse {
        message: "User status updated successfully".to_string(),
        user,
    }))
}
