//! Shared types for every driftwood crate.

mod types;

pub use types::{NodeId, Transform, heading_forward};
