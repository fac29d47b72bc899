/// Site settings endpoints
///
/// - `GET /api/settings` - Current settings (public)
/// - `PUT /api/settings` - Update settings
/// - `PUT /api/settings/seo` - Update only the SEO fields

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
};
use axum::{extract::State, Json};
use cms_shared::{
    auth::{authorization::require_role, middleware::AuthContext},
    models::{
        settings::{Settings, UpdateSeo, UpdateSettings},
        user::Role,
    },
    store::Collection,
};
use serde::Serialize;
use tracing::info;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub message: String,
    pub settings: Settings,
}

pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
    let settings: Settings = state.store.read_as(Collection::Settings).await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<UpdateSettings>,
) -> ApiResult<Json<SettingsResponse>> {
    require_role(&auth, Role::Editor)?;
    req.validate()?;

    let settings = state
        .store
        .update(Collection::Settings, |settings: &mut Settings| {
            settings.apply(req);
            Ok::<_, ApiError>(settings.clone())
        })
        .await?;

    info!(updated_by = %auth.user.id, "Settings updated");

    Ok(Json(SettingsResponse {
        message: "Settings updated successfully".to_string(),
        settings,
    }))
}

pub async fn update_seo(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<UpdateSeo>,
) -> ApiResult<Json<SettingsResponse>> {
    require_role(&auth, Role::Editor)?;

    let settings = state
        .store
        .update(Collection::Settings, |settings: &mut Settings| {
            settings.apply_seo(req);
            Ok::<_, ApiError>(settings.clone())
        })
        .await?;

    info!(updated_by = %auth.user.id, "SEO settings updated");

    Ok(Json(SettingsResponse {
        message: "SEO settings updated successfully".to_string(),
        settings,
    }))
}
