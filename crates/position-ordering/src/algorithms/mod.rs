//! Algorithms for Position Ordering
//!
//! - Rank allocation (initial, after, before, between, spread)
//! - Integer ordering for the coarse tier

pub mod allocator;
pub mod coarse;

pub use allocator::{RankAllocator, DEFAULT_MAX_RANK_LENGTH};
pub use coarse::{next_order, renumber_with_move};
