//! Model assets: glTF / GLB import and asynchronous loading.
//!
//! The game only needs a name, a base colour and an axis-aligned bounding
//! box. Renderers additionally get the triangle geometry of every mesh,
//! flattened through the node tree into one model-space mesh.
//!
//! # Invariants
//! - A `LoadHandle` only moves forward: `Pending` -> `Ready` or `Failed`.
//! - Loader threads never touch game state; results are handed back over a
//!   channel and picked up by whoever polls the handle.

mod import;
mod loader;
mod model;

pub use import::{load_model_file, parse_model};
pub use loader::{LoadHandle, LoadState, ModelLoader, PrimitiveLoader, ThreadedLoader};
pub use model::{Bounds, MeshData, Model, ModelId};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
}

pub fn crate_info() -> &'static str {
    "driftwood-assets v0.1.0"
}
