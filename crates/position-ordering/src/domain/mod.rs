//! Domain module for Position Ordering
//!
//! Contains rank values, entities, errors, and invariants.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod rank;

pub use entities::*;
pub use errors::*;
pub use rank::RankValue;
