//! Rendering Adapter: renderer-agnostic view and environment description.
//!
//! # Invariants
//! - Renderers read the scene; they never add, remove or move nodes.
//! - Environment animation (water time) advances once per rendered frame,
//!   independently of the simulation tick.

mod environment;
mod renderer;

pub use environment::{Environment, SkyParams, WaterParams, hex_color};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "driftwood-render v0.1.0"
}
