/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Exchange credentials for a bearer token
/// - `POST /api/auth/logout` - Acknowledge logout (tokens are stateless)
/// - `GET /api/auth/me` - Current user

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
};
use axum::{extract::State, Json};
use chrono::Utc;
use cms_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{find_by_login, PublicUser, User, UserStatus},
    store::Collection,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,

    /// Bearer token (24h)
    pub token: String,

    pub user: PublicUser,
}

/// Current user response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Login with username (or email) and password
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "username": "admin", "password": "admin123" }
/// ```
///
/// # Response
///
/// ```json
/// { "message": "Login successful", "token": "eyJ...", "user": { "id": "1", ... } }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing username or password
/// - `401 Unauthorized`: Invalid credentials or inactive account
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let users: Vec<User> = state.store.read_as(Collection::Users).await?;

    let Some(user) = find_by_login(&users, &req.username) else {
        warn!(login = %req.username, "Login attempt for unknown user");
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    };

    if !password::verify_password_blocking(req.password, user.password.clone()).await? {
        warn!(user_id = %user.id, "Login attempt with wrong password");
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    if user.status != UserStatus::Active {
        warn!(user_id = %user.id, status = %user.status, "Login attempt on inactive account");
        return Err(ApiError::Unauthorized("Account is not active".to_string()));
    }

    let user_id = user.id.clone();
    let token = jwt::issue_token(&user_id, state.jwt_secret())?;

    // Record the login; the user may have been removed since the read above
    let user = state
        .store
        .update(Collection::Users, |users: &mut Vec<User>| {
            let user = users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;
            user.last_login = Some(Utc::now());
            Ok::<_, ApiError>(user.public())
        })
        .await?;

    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

/// Logout
///
/// Tokens are not tracked server-side; the client discards its token.
pub async fn logout(auth: AuthContext) -> Json<MessageResponse> {
    info!(user_id = %auth.user.id, "User logged out");
    MessageResponse::new("Logout successful")
}

/// Returns the authenticated user
pub async fn me(auth: AuthContext) -> Json<MeResponse> {
    Json(MeResponse {
        user: auth.user.public(),
    })
}
