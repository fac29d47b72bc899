/// Page section endpoints
///
/// - `GET /api/content/sections` - All sections (public)
/// - `GET /api/content/sections/:section` - One section (public)
/// - `PUT /api/content/sections/:section` - Update or create a section

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use cms_shared::{
    auth::{authorization::require_role, middleware::AuthContext},
    models::{
        content::{Section, Sections, UpdateSection},
        user::Role,
    },
    store::Collection,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub message: String,
    pub section: Section,
}

pub async fn list_sections(State(state): State<AppState>) -> ApiResult<Json<Sections>> {
    let sections: Sections = state.store.read_as(Collection::Sections).await?;
    Ok(Json(sections))
}

pub async fn get_section(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Section>> {
    let mut sections: Sections = state.store.read_as(Collection::Sections).await?;

    sections
        .remove(&name)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))
}

/// Merges the given fields into a section, creating it if needed
pub async fn update_section(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(name): Path<String>,
    ApiJson(req): ApiJson<UpdateSection>,
) -> ApiResult<Json<SectionResponse>> {
    require_role(&auth, Role::Editor)?;

    let section = state
        .store
        .update(Collection::Sections, |sections: &mut Sections| {
            let section = sections.entry(name.clone()).or_default();
            section.merge(req);
            Ok::<_, ApiError>(section.clone())
        })
        .await?;

    info!(section = %name, updated_by = %auth.user.id, "Section updated");

    Ok(Json(SectionResponse {
        message: "Section updated successfully".to_string(),
        section,
    }))
}
