//! Game kernel: authoritative game state, per-frame update and collision pass.
//!
//! # Invariants
//! - All mutation happens on the thread that owns `GameState`.
//! - The scene graph is only reached through the `SceneGraph` trait.
//! - Collected trash is removed from the scene exactly once and never
//!   collision-tested again.
//! - Boat speeds are expressed per reference frame (1/60 s) and the loop
//!   advances in whole reference frames.

pub mod boat;
pub mod collision;
pub mod config;
pub mod game;
pub mod scene;
pub mod trash;

pub use boat::{Boat, REFERENCE_FRAME};
pub use collision::{COLLISION_EXTENT, is_colliding};
pub use config::{AssetPaths, BoatConfig, ConfigError, GameConfig, TrashConfig};
pub use game::{GameEvent, GameState, Phase};
pub use scene::{Scene, SceneGraph, SceneNode};
pub use trash::{Band, Trash, scatter};
