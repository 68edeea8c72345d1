//! crates/domains/src/lib.rs
//!
//! Entities, invariants and port definitions for the free board.

pub mod error;
pub mod models;
pub mod policy;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use policy::{BoardPolicy, MAX_RANKING_WINDOW_DAYS};
pub use ports::*;
