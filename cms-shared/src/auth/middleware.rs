/// Request authentication for Axum
///
/// Resolves the `Authorization: Bearer <token>` header to a stored user:
///
/// ```text
/// NoToken --extract--> TokenPresent --verify--> Valid --lookup--> Found    => Authorized
///    |                                   |                  \--> NotFound => Rejected
///    \--> Rejected                       \--> Invalid => Rejected
/// ```
///
/// [`require_user`] runs this for every protected route and places an
/// [`AuthContext`] in the request extensions. Rejections are 401 responses
/// with a JSON `{ "error": ... }` body.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use cms_shared::auth::middleware::{require_user, AuthContext, Authenticator};
/// use cms_shared::store::CollectionStore;
///
/// async fn me(auth: AuthContext) -> String {
///     auth.user.username
/// }
///
/// let authenticator = Authenticator::new("a-server-secret-of-at-least-32-bytes!", CollectionStore::in_memory());
/// let app: Router = Router::new()
///     .route("/me", get(me))
///     .route_layer(middleware::from_fn_with_state(authenticator, require_user));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

use super::jwt::{validate_token, JwtError};
use crate::models::user::{find_by_id, User};
use crate::store::{Collection, CollectionStore};

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token on the request
    #[error("Access token required")]
    MissingToken,

    /// Signature, expiry or format check failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is valid but its user no longer exists
    #[error("User not found")]
    UnknownUser,

    /// Users could not be loaded
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuthError {
    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::UnknownUser => "unknown_user",
            AuthError::Storage(_) => "internal_error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Storage(detail) => {
                error!(error = %detail, "Authentication failed on storage");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            other => (StatusCode::UNAUTHORIZED, other.to_string()),
        };

        let body = Json(json!({ "error": message, "code": self.code() }));
        (status, body).into_response()
    }
}

/// Authenticated caller, available to handlers behind [`require_user`]
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Stored user record the token resolved to
    pub user: User,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Everything needed to authenticate a request
#[derive(Debug, Clone)]
pub struct Authenticator {
    secret: Arc<str>,
    store: CollectionStore,
}

impl Authenticator {
    pub fn new(secret: impl Into<Arc<str>>, store: CollectionStore) -> Self {
        Self {
            secret: secret.into(),
            store,
        }
    }

    /// Resolves request headers to a user
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<User, AuthError> {
        authenticate(headers, &self.secret, &self.store).await
    }
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authenticates a request by its headers
///
/// # Errors
///
/// - `AuthError::MissingToken` when there is no bearer token
/// - `AuthError::InvalidToken` on signature, expiry or issuer failure
/// - `AuthError::UnknownUser` when no stored user has the token's ID
pub async fn authenticate(
    headers: &HeaderMap,
    secret: &str,
    store: &CollectionStore,
) -> Result<User, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    let users: Vec<User> = store
        .read_as(Collection::Users)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

    let user = find_by_id(&users, &claims.user_id)
        .cloned()
        .ok_or(AuthError::UnknownUser)?;

    debug!(user_id = %user.id, role = %user.role, "Request authenticated");
    Ok(user)
}

/// Middleware rejecting requests without a valid bearer token
pub async fn require_user(
    State(authenticator): State<Authenticator>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticator.authenticate(req.headers()).await?;
    req.extensions_mut().insert(AuthContext { user });

    Ok(next.run(req).await)
}
