//! # Position Ordering Subsystem
//!
//! Keeps a stable linear order over items grouped under a parent (cards under
//! a list, lists under a board) without rewriting every sibling when one item
//! moves.
//!
//! ## Architecture
//!
//! - **Domain**: `RankValue`, entities, errors, ordering invariants
//! - **Algorithms**: rank allocation (initial, after, before, between, spread),
//!   integer ordering for the coarse tier
//! - **Ports**: Inbound (`PositionApi`, `CoarseOrderingApi`) and Outbound
//!   (`OrderedItemStore`, `CoarseItemStore`)
//! - **Application**: `PositionManager`, `RebalanceCoordinator`,
//!   `CoarseOrderingService`
//! - **Adapters**: `InMemoryPositionStore`
//! - **IPC**: request handler and payloads for the CRUD layer
//!
//! ## Concurrency
//!
//! Nothing here holds state across requests. Every operation reads the parent
//! revision, reads neighbors, computes a rank, and writes it only if the
//! revision is unchanged. A stale write restarts the cycle; the number of
//! cycles is bounded by `PositionConfig::max_write_attempts`.

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use adapters::InMemoryPositionStore;
pub use algorithms::{RankAllocator, DEFAULT_MAX_RANK_LENGTH};
pub use application::{CoarseOrderingService, PositionManager, RebalanceCoordinator};
pub use config::{ConfigError, PositionConfig};
pub use domain::entities::*;
pub use domain::errors::{CoarseOrderError, PositionError, RankError, StoreError};
pub use domain::rank::RankValue;
pub use ipc::{InsertRequest, MoveRequest, PositionRequestHandler, PositionResponse};
pub use ports::inbound::{CoarseOrderingApi, PositionApi};
pub use ports::outbound::{CoarseItemStore, OrderedItemStore};
