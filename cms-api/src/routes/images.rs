/// Image library endpoints
///
/// All image routes require authentication; files themselves are served
/// publicly under `/uploads/images/`.
///
/// - `POST /api/images/upload` - Upload an image (multipart field `image`,
///   optional text fields `alt` and `category`)
/// - `GET /api/images` - List images
/// - `GET /api/images/:id` - Get image metadata
/// - `PUT /api/images/:id` - Update alt text and category
/// - `DELETE /api/images/:id` - Delete image and its file

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
        media::{Image, MediaKind, UpdateImage},
        next_id,
        user::Role,
    },
    store::Collection,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub message: String,
    pub image: Image,
}

fn image_not_found() -> ApiError {
    ApiError::NotFound("Image not found".to_string())
}

/// Uploads an image
///
/// The file is written before its metadata; if the metadata cannot be
/// stored the file is removed again.
pub async fn upload_image(
    State(state): State<AppState>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ImageResponse>)> {
    require_role(&auth, Role::Editor)?;

    let mut form = read_upload(multipart, MediaKind::Image).await?;
    let alt = form.take("alt").unwrap_or_default();
    let category = form.take("category").unwrap_or_else(|| "general".to_string());
    let stored = state.uploads.save(MediaKind::Image, &form.upload).await?;

    let filename = stored.filename.clone();
    let result = state
        .store
        .update(Collection::Images, |images: &mut Vec<Image>| {
            let image = Image {
                id: next_id(images.iter().map(|i| i.id.as_str())),
                filename: stored.filename,
                original_name: form.upload.original_name,
                alt,
                category,
                path: stored.path,
                size: stored.size,
                uploaded_at: Utc::now(),
                updated_at: None,
            };
            images.push(image.clone());
            Ok::<_, ApiError>(image)
        })
        .await;

    let image = match result {
        Ok(image) => image,
        Err(e) => {
            state.uploads.remove(MediaKind::Image, &filename).await;
            return Err(e);
        }
    };

    info!(image_id = %image.id, filename = %image.filename, size = image.size, "Image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(ImageResponse {
            message: "Image uploaded successfully".to_string(),
            image,
        }),
    ))
}

pub async fn list_images(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<Image>>> {
    let images: Vec<Image> = state.store.read_as(Collection::Images).await?;
    Ok(Json(images))
}

pub async fn get_image(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Image>> {
    let images: Vec<Image> = state.store.read_as(Collection::Images).await?;

    images
        .into_iter()
        .find(|i| i.id == id)
        .map(Json)
        .ok_or_else(image_not_found)
}

pub async fn update_image(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateImage>,
) -> ApiResult<Json<ImageResponse>> {
    require_role(&auth, Role::Editor)?;

    let image = state
        .store
        .update(Collection::Images, |images: &mut Vec<Image>| {
            let image = images.iter_mut().find(|i| i.id == id).ok_or_else(image_not_found)?;
            image.apply(req);
            Ok::<_, ApiError>(image.clone())
        })
        .await?;

    info!(image_id = %image.id, "Image updated");

    Ok(Json(ImageResponse {
        message: "Image updated successfully".to_string(),
        image,
    }))
}

pub async fn delete_image(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, Role::Editor)?;

    let removed = state
        .store
        .update(Collection::Images, |images: &mut Vec<Image>| {
            let index = images.iter().position(|i| i.id == id).ok_or_else(image_not_found)?;
            Ok::<_, ApiError>(images.remove(index))
        })
        .await?;

    state.uploads.remove(MediaKind::Image, &removed.filename).await;

    info!(image_id = %id, filename = %removed.filename, "Image deleted");

    Ok(MessageResponse::new("Image deleted successfully"))
}
