//! Request handling for the CRUD layer
//!
//! - Accept: `InsertRequest`, `MoveRequest`
//! - Return: `PositionResponse` with the placed item or a classified error

pub mod handler;
pub mod payloads;

pub use handler::PositionRequestHandler;
pub use payloads::*;
