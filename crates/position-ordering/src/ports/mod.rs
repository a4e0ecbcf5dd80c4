//! Ports module for Position Ordering
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::{CoarseOrderingApi, PositionApi};
pub use outbound::{CoarseItemStore, OrderedItemStore};
