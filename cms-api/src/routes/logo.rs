/// Site logo endpoints
///
/// - `GET /api/logo` - Current logo, `{}` when unset (public)
/// - `POST /api/logo/upload` - Replace the logo (multipart field `logo`)
/// - `DELETE /api/logo` - Remove the logo

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{auth::MessageResponse, media::read_upload},
};
use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use cms_shared::{
    auth::{authorization::require_role, middleware::AuthContext},
    models::{
        media::{Logo, MediaKind},
        user::Role,
    },
    store::Collection,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct LogoResponse {
    pub message: String,
    pub logo: Logo,
}

pub async fn get_logo(State(state): State<AppState>) -> ApiResult<Json<Logo>> {
    let logo: Logo = state.store.read_as(Collection::Logo).await?;
    Ok(Json(logo))
}

/// Uploads a new logo
///
/// The previous logo file is removed once the new one is recorded.
pub async fn upload_logo(
    State(state): State<AppState>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<Json<LogoResponse>> {
    require_role(&auth, Role::Editor)?;

    let form = read_upload(multipart, MediaKind::Logo).await?;
    let stored = state.uploads.save(MediaKind::Logo, &form.upload).await?;

    let logo = Logo {
        filename: Some(stored.filename.clone()),
        original_name: Some(form.upload.original_name),
        path: Some(stored.path),
        uploaded_at: Some(Utc::now()),
    };

    let result = state
        .store
        .update(Collection::Logo, |current: &mut Logo| {
            let previous = std::mem::replace(current, logo.clone());
            Ok::<_, ApiError>(previous)
        })
        .await;

    let previous = match result {
        Ok(previous) => previous,
        Err(e) => {
            state.uploads.remove(MediaKind::Logo, &stored.filename).await;
            return Err(e);
        }
    };

    if let Some(old) = previous.filename.as_deref() {
        state.uploads.remove(MediaKind::Logo, old).await;
    }

    info!(filename = %stored.filename, replaced = previous.is_set(), "Logo uploaded");

    Ok(Json(LogoResponse {
        message: "Logo uploaded successfully".to_string(),
        logo,
    }))
}

/// Removes the logo and its file
///
/// # Errors
///
/// - `404 Not Found`: No logo is set
pub async fn delete_logo(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, Role::Editor)?;

    let previous = state
        .store
        .update(Collection::Logo, |current: &mut Logo| {
            if !current.is_set() {
                return Err(ApiError::NotFound("No logo set".to_string()));
            }
            Ok(std::mem::take(current))
        })
        .await?;

    if let Some(filename) = previous.filename.as_deref() {
        state.uploads.remove(MediaKind::Logo, filename).await;
    }

    info!("Logo removed");

    Ok(MessageResponse::new("Logo removed successfully"))
}
