/// Page block endpoints
///
/// Reads are public; changes require an `editor` or `admin`.
///
/// # Endpoints
///
/// - `GET /api/blocks` - List blocks sorted by order
/// - `POST /api/blocks` - Create block
/// - `PUT /api/blocks/reorder` - Reorder blocks
/// - `GET /api/blocks/:id` - Get block
/// - `PUT /api/blocks/:id` - Update block
/// - `DELETE /api/blocks/:id` - Delete block

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
    auth::{authorization::require_role, middleware::AuthContext},
    models::{
        block::{reorder, sort_by_order, Block, CreateBlock, ReorderBlocks, UpdateBlock},
        user::Role,
    },
    store::Collection,
};
use serde::Serialize;
use tracing::info;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub message: String,
    pub block: Block,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub message: String,
    pub blocks: Vec<Block>,
}

pub async fn list_blocks(State(state): State<AppState>) -> ApiResult<Json<Vec<Block>>> {
    let mut blocks: Vec<Block> = state.store.read_as(Collection::Blocks).await?;
    sort_by_order(&mut blocks);
    Ok(Json(blocks))
}

pub async fn get_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Block>> {
    let blocks: Vec<Block> = state.store.read_as(Collection::Blocks).await?;

    blocks
        .into_iter()
        .find(|b| b.id == id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Block not found".to_string()))
}

/// Creates a block at the end of the page
///
/// # Errors
///
/// - `400 Bad Request`: Missing ID or type, or the ID is taken
pub async fn create_block(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateBlock>,
) -> ApiResult<(StatusCode, Json<BlockResponse>)> {
    require_role(&auth, Role::Editor)?;
    req.validate()?;

    let block = state
        .store
        .update(Collection::Blocks, |blocks: &mut Vec<Block>| {
            if blocks.iter().any(|b| b.id == req.id) {
                return Err(ApiError::Conflict("Block with this ID already exists".to_string()));
            }

            let block = Block::new(req, blocks.len());
            blocks.push(block.clone());
            Ok(block)
        })
        .await?;

    info!(block_id = %block.id, kind = %block.kind, order = block.order, "Block created");

    Ok((
        StatusCode::CREATED,
        Json(BlockResponse {
            message: "Block created successfully".to_string(),
            block,
        }),
    ))
}

pub async fn update_block(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateBlock>,
) -> ApiResult<Json<BlockResponse>> {
    require_role(&auth, Role::Editor)?;
    req.validate()?;

    let block = state
        .store
        .update(Collection::Blocks, |blocks: &mut Vec<Block>| {
            let block = blocks
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| ApiError::NotFound("Block not found".to_string()))?;

            block.apply(req);
            Ok::<_, ApiError>(block.clone())
        })
        .await?;

    info!(block_id = %block.id, "Block updated");

    Ok(Json(BlockResponse {
        message: "Block updated successfully".to_string(),
        block,
    }))
}

pub async fn delete_block(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, Role::Editor)?;

    state
        .store
        .update(Collection::Blocks, |blocks: &mut Vec<Block>| {
            let before = blocks.len();
            blocks.retain(|b| b.id != id);

            if blocks.len() == before {
                return Err(ApiError::NotFound("Block not found".to_string()));
            }
            Ok(())
        })
        .await?;

    info!(block_id = %id, "Block deleted");

    Ok(MessageResponse::new("Block deleted successfully"))
}

/// Assigns block order from a list of IDs
///
/// ```text
/// PUT /api/blocks/reorder
///
/// { "blockIds": ["features", "hero", "contact"] }
/// ```
///
/// Unknown IDs are ignored; blocks not listed keep their order.
pub async fn reorder_blocks(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<ReorderBlocks>,
) -> ApiResult<Json<ReorderResponse>> {
    require_role(&auth, Role::Editor)?;

    let (moved, blocks) = state
        .store
        .update(Collection::Blocks, |blocks: &mut Vec<Block>| {
            let moved = reorder(blocks, &req.block_ids);
            Ok::<_, ApiError>((moved, blocks.clone()))
        })
        .await?;

    info!(requested = req.block_ids.len(), moved, "Blocks reordered");

    Ok(Json(ReorderResponse {
        message: "Blocks reordered successfully".to_string(),
        blocks,
    }))
}
