/// Video library endpoints
///
/// Listing and reading videos is public; changes require an `editor`.
///
/// - `POST /api/videos/upload` - Upload a video (multipart field `video`,
///   optional text fields `title` and `description`)
/// - `GET /api/videos` - List videos
/// - `GET /api/videos/:id` - Get video metadata
/// - `PUT /api/videos/:id` - Update title and description
/// - `DELETE /api/videos/:id` - Delete video and its file

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
    routes::{auth::MessageResponse, media::read_upload},
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use cms_shared::{
    auth::{authorization::require_role, middleware::AuthContext},
    models::{
        media::{MediaKind, UpdateVideo, Video},
        next_id,
        user::Role,
    },
    store::Collection,
};
use serde::Serialize;
use tracing::info;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub message: String,
    pub video: Video,
}

fn video_not_found() -> ApiError {
    ApiError::NotFound("Video not found".to_string())
}

/// Uploads a video
///
/// The title defaults to the original file name.
pub async fn upload_video(
    State(state): State<AppState>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<VideoResponse>)> {
    require_role(&auth, Role::Editor)?;

    let mut form = read_upload(multipart, MediaKind::Video).await?;
    let title = form.take("title");
    let description = form.take("description");
    let stored = state.uploads.save(MediaKind::Video, &form.upload).await?;

    let filename = stored.filename.clone();
    let result = state
        .store
        .update(Collection::Videos, |videos: &mut Vec<Video>| {
            let video = Video {
                id: next_id(videos.iter().map(|v| v.id.as_str())),
                filename: stored.filename,
                title: title.unwrap_or_else(|| form.upload.original_name.clone()),
                original_name: form.upload.original_name,
                description: description.unwrap_or_default(),
                path: stored.path,
                size: stored.size,
                uploaded_at: Utc::now(),
                updated_at: None,
            };
            videos.push(video.clone());
            Ok::<_, ApiError>(video)
        })
        .await;

    let video = match result {
        Ok(video) => video,
        Err(e) => {
            state.uploads.remove(MediaKind::Video, &filename).await;
            return Err(e);
        }
    };

    info!(video_id = %video.id, filename = %video.filename, size = video.size, "Video uploaded");

    Ok((
        StatusCode::CREATED,
        Json(VideoResponse {
            message: "Video uploaded successfully".to_string(),
            video,
        }),
    ))
}

pub async fn list_videos(State(state): State<AppState>) -> ApiResult<Json<Vec<Video>>> {
    let videos: Vec<Video> = state.store.read_as(Collection::Videos).await?;
    Ok(Json(videos))
}

pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Video>> {
    let videos: Vec<Video> = state.store.read_as(Collection::Videos).await?;

    videos
        .into_iter()
        .find(|v| v.id == id)
        .map(Json)
        .ok_or_else(video_not_found)
}

pub async fn update_video(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateVideo>,
) -> ApiResult<Json<VideoResponse>> {
    require_role(&auth, Role::Editor)?;
    req.validate()?;

    let video = state
        .store
        .update(Collection::Videos, |videos: &mut Vec<Video>| {
            let video = videos.iter_mut().find(|v| v.id == id).ok_or_else(video_not_found)?;
            video.apply(req);
            Ok::<_, ApiError>(video.clone())
        })
        .await?;

    info!(video_id = %video.id, "Video updated");

    Ok(Json(VideoResponse {
        message: "Video updated successfully".to_string(),
        video,
    }))
}

pub async fn delete_video(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, Role::Editor)?;

    let removed = state
        .store
        .update(Collection::Videos, |videos: &mut Vec<Video>| {
            let index = videos.iter().position(|v| v.id == id).ok_or_else(video_not_found)?;
            Ok::<_, ApiError>(videos.remove(index))
        })
        .await?;

    state.uploads.remove(MediaKind::Video, &removed.filename).await;

    info!(video_id = %id, filename = %removed.filename, "Video deleted");

    Ok(MessageResponse::new("Video deleted successfully"))
}
