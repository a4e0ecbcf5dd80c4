//! Application services
//!
//! - `PositionManager`: insert and move orchestration
//! - `RebalanceCoordinator`: full-parent renumbering
//! - `CoarseOrderingService`: integer ordering tier

pub mod coarse;
pub mod rebalance;
pub mod service;

pub use coarse::CoarseOrderingService;
pub use rebalance::RebalanceCoordinator;
pub use service::PositionManager;
