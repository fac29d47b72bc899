/// Page block model
///
/// Blocks are ordered building pieces of the public page. Each block has a
/// client-chosen ID, a `type` understood by the front end, a free-form
/// `content` object and a 1-based `order`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::default_true;

/// Block record as stored in the `blocks` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Client-chosen unique ID
    pub id: String,

    /// Block type (e.g. "hero", "gallery")
    #[serde(rename = "type")]
    pub kind: String,

    /// 1-based position on the page
    #[serde(default)]
    pub order: u32,

    /// Free-form content rendered by the front end
    #[serde(default)]
    pub content: Map<String, Value>,

    /// Whether the block is shown
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a block
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBlock {
    #[validate(length(min = 1, message = "Block ID is required"))]
    pub id: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Block type is required"))]
    pub kind: String,

    pub content: Option<Map<String, Value>>,

    pub enabled: Option<bool>,
}

/// Input for updating a block
///
/// The block ID cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBlock {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Block type cannot be empty"))]
    pub kind: Option<String>,

    pub content: Option<Map<String, Value>>,

    pub enabled: Option<bool>,

    pub order: Option<u32>,
}

/// Input for reordering blocks
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReorderBlocks {
    /// Block IDs in their new order
    pub block_ids: Vec<String>,
}

impl Block {
    /// Builds a block appended after `existing` blocks
    pub fn new(input: CreateBlock, existing: usize) -> Self {
        let now = Utc::now();

        Self {
            id: input.id,
            kind: input.kind,
            order: existing as u32 + 1,
            content: input.content.unwrap_or_default(),
            enabled: input.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an update
    pub fn apply(&mut self, update: UpdateBlock) {
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(order) = update.order {
            self.order = order;
        }
        self.updated_at = Utc::now();
    }
}

/// Sorts blocks by their `order` field
pub fn sort_by_order(blocks: &mut [Block]) {
    blocks.sort_by_key(|b| b.order);
}

/// Assigns `order` from the position of each ID in `ids`
///
/// Unknown IDs are ignored and blocks not listed keep their order.
/// Returns the number of blocks that were repositioned.
pub fn reorder(blocks: &mut [Block], ids: &[String]) -> usize {
    let now = Utc::now();
    let mut moved = 0;

    for (index, id) in ids.iter().enumerate() {
        if let Some(block) = blocks.iter_mut().find(|b| &b.id == id) {
            block.order = index as u32 + 1;
            block.updated_at = now;
            moved += 1;
        }
    }

    sort_by_order(blocks);
    moved
}
