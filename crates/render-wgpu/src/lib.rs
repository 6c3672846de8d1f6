//! wgpu render backend for the driftwood scene.
//!
//! Draws the water plane with sun glints and animated ripples, clears to a
//! sky colour derived from the sun, and draws every scene node with its
//! imported model mesh, instanced per model. Placeholder models are drawn
//! as a box sized to their bounds. The camera orbits a fixed target.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Camera motion is outside the simulation and not part of the state hash.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
