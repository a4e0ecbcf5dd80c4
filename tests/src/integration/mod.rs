//! # Integration Tests
//!
//! End-to-end behavior of the position manager against the in-memory store:
//!
//! - `scenarios`: insert, move and rebalance walkthroughs
//! - `concurrency`: racing writers and bounded retries
//! - `order_stability`: randomized operations checked against a model
//! - `precision`: deep nesting within one gap

pub mod order_stability;
pub mod precision;
pub mod scenarios;
