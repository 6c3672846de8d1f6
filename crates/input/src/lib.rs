//! Steering input: four directional intents folded into a per-frame snapshot.
//!
//! # Invariants
//! - The simulation consumes `InputSnapshot`s, never raw key events.
//! - Releasing any key clears both throttle and rudder.

pub mod action;
pub mod controls;

pub use action::{Axis, Direction, KeyEvent};
pub use controls::{ControlState, InputSnapshot};

pub fn crate_info() -> &'static str {
    "driftwood-input v0.1.0"
}
