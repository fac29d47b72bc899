/// Dashboard endpoints
///
/// - `GET /api/dashboard` - Counts plus the most recent blocks and submissions
/// - `GET /api/dashboard/stats` - Counts only
/// - `POST /api/dashboard/backup` - Write every collection to a backup file (admin)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use cms_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::{block::Block, form::Submission},
    store::{Collection, CollectionStore},
};
use serde::Serialize;
use tracing::info;

/// Number of recent records shown on the dashboard
const RECENT: usize = 5;

/// Collection counts
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub users: usize,
    pub blocks: usize,
    pub forms: usize,
    pub submissions: usize,
    pub images: usize,
    pub videos: usize,
    pub total_uploads: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: Stats,
    pub recent_blocks: Vec<Block>,
    pub recent_submissions: Vec<Submission>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BackupResponse {
    pub message: String,

    /// Backup file name
    pub file: String,
}

async fn count(store: &CollectionStore, collection: Collection) -> usize {
    Collection::size_of(&store.read(collection).await)
}

async fn collect_stats(store: &CollectionStore) -> Stats {
    let images = count(store, Collection::Images).await;
    let videos = count(store, Collection::Videos).await;

    Stats {
        users: count(store, Collection::Users).await,
        blocks: count(store, Collection::Blocks).await,
        forms: count(store, Collection::Forms).await,
        submissions: count(store, Collection::Submissions).await,
        images,
        videos,
        total_uploads: images + videos,
    }
}

fn last<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let start = items.len().saturating_sub(n);
    items.split_off(start)
}

pub async fn stats(State(state): State<AppState>, _auth: AuthContext) -> Json<Stats> {
    Json(collect_stats(&state.store).await)
}

pub async fn overview(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<DashboardResponse>> {
    let stats = collect_stats(&state.store).await;
    let blocks: Vec<Block> = state.store.read_as(Collection::Blocks).await?;
    let submissions: Vec<Submission> = state.store.read_as(Collection::Submissions).await?;

    Ok(Json(DashboardResponse {
        stats,
        recent_blocks: last(blocks, RECENT),
        recent_submissions: last(submissions, RECENT),
        message: "Dashboard loaded successfully".to_string(),
    }))
}

/// Writes a backup of every collection under `<DATA_DIR>/backups/`
pub async fn backup(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<(StatusCode, Json<BackupResponse>)> {
    require_admin(&auth)?;

    let path = state.store.backup(&state.config.backup_dir()).await?;
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!(file = %path.display(), requested_by = %auth.user.id, "Backup written");

    Ok((
        StatusCode::CREATED,
        Json(BackupResponse {
            message: "Backup created successfully".to_string(),
            file,
        }),
    ))
}
