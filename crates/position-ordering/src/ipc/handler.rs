//! Request handler for the CRUD layer
//!
//! Converts payloads into domain calls and domain errors into responses that
//! tell the caller whether repeating the request may help.

use crate::domain::entities::Placement;
use crate::ipc::payloads::{InsertRequest, MoveRequest, PositionResponse};
use crate::ports::inbound::PositionApi;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Stateless front door to a [`PositionApi`].
pub struct PositionRequestHandler {
    api: Arc<dyn PositionApi>,
}

impl PositionRequestHandler {
    pub fn new(api: Arc<dyn PositionApi>) -> Self {
        Self { api }
    }

    /// Create an item; appends when no neighbor is named.
    pub async fn handle_insert(&self, request: InsertRequest) -> PositionResponse {
        let start_time = Instant::now();

        let result = match (request.after_id, request.before_id) {
            (None, None) => self.api.insert_at_end(&request.parent_id).await,
            (prev, next) => {
                self.api
                    .insert_between(&request.parent_id, Placement::new(prev, next))
                    .await
            }
        };

        match result {
            Ok(item) => {
                info!(
                    item = %item.id,
                    parent = %item.parent_id,
                    elapsed_us = start_time.elapsed().as_micros() as u64,
                    "Insert request completed"
                );
                PositionResponse::ok(item)
            }
            Err(e) => {
                warn!(parent = %request.parent_id, error = %e, retryable = e.is_retryable(), "Insert request failed");
                PositionResponse::failed(&e)
            }
        }
    }

    /// Move an item to a new parent and position; appends when no neighbor
    /// is named.
    pub async fn handle_move(&self, request: MoveRequest) -> PositionResponse {
        let start_time = Instant::now();
        let placement = Placement::new(request.after_id, request.before_id);

        match self
            .api
            .move_item(&request.item_id, &request.new_parent_id, placement)
            .await
        {
            Ok(item) => {
                info!(
                    item = %item.id,
                    parent = %item.parent_id,
                    elapsed_us = start_time.elapsed().as_micros() as u64,
                    "Move request completed"
                );
                PositionResponse::ok(item)
            }
            Err(e) => {
                warn!(item = %request.item_id, error = %e, retryable = e.is_retryable(), "Move request failed");
                PositionResponse::failed(&e)
            }
        }
    }
}
