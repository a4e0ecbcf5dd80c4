//! Request and response payloads
//!
//! The CRUD layer deserializes these from form or JSON bodies and hands them to
//! [`PositionRequestHandler`](super::handler::PositionRequestHandler).

use crate::domain::entities::{ItemId, OrderedItem, ParentId};
use crate::domain::errors::PositionError;
use serde::{Deserialize, Serialize};

// ============================================================
// INCOMING REQUESTS
// ============================================================

/// Create a new item.
///
/// With neither neighbor the item is appended at the end of the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertRequest {
    pub parent_id: ParentId,
    /// Item that should end up directly before the new one
    #[serde(default)]
    pub after_id: Option<ItemId>,
    /// Item that should end up directly after the new one
    #[serde(default)]
    pub before_id: Option<ItemId>,
}

/// Move an existing item, possibly to another parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub item_id: ItemId,
    pub new_parent_id: ParentId,
    #[serde(default)]
    pub after_id: Option<ItemId>,
    #[serde(default)]
    pub before_id: Option<ItemId>,
}

// ============================================================
// OUTGOING RESPONSES
// ============================================================

/// Item as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub id: ItemId,
    pub parent_id: ParentId,
    pub rank: String,
}

impl From<OrderedItem> for ItemPayload {
    fn from(item: OrderedItem) -> Self {
        Self {
            id: item.id,
            parent_id: item.parent_id,
            rank: item.rank.into(),
        }
    }
}

/// Error details for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Stable machine-readable code
    pub code: String,
    pub message: String,
    /// Whether repeating the whole request may succeed
    pub retryable: bool,
}

impl From<&PositionError> for ErrorPayload {
    fn from(err: &PositionError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Response to an insert or move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl PositionResponse {
    pub fn ok(item: OrderedItem) -> Self {
        Self {
            success: true,
            item: Some(item.into()),
            error: None,
        }
    }

    pub fn failed(err: &PositionError) -> Self {
        Self {
            success: false,
            item: None,
            error: Some(err.into()),
        }
    }
}
