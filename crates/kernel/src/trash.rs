use std::sync::Arc;

use glam::{Quat, Vec3};
use rand::Rng;

use driftwood_assets::Model;
use driftwood_common::{NodeId, Transform};

use crate::config::TrashConfig;
use crate::scene::{SceneGraph, SceneNode};

/// Which placement band a piece of trash was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Near,
    Far,
}

/// Draw a resting position for one piece of trash.
///
/// One coin flip picks the band for both axes. Near pieces land within
/// `near_extent` of the origin on X and Z; far pieces within `far_extent_x`
/// and `far_extent_z`.
pub fn scatter<R: Rng>(rng: &mut R, config: &TrashConfig) -> (Vec3, Band) {
    let band = if rng.gen_bool(config.near_probability) {
        Band::Near
    } else {
        Band::Far
    };
    let (ex, ez) = match band {
        Band::Near => (config.near_extent, config.near_extent),
        Band::Far => (config.far_extent_x, config.far_extent_z),
    };
    let x = rng.gen_range(-ex..ex);
    let z = rng.gen_range(-ez..ez);
    (Vec3::new(x, config.depth, z), band)
}

/// A static piece of floating debris.
#[derive(Debug, Clone)]
pub struct Trash {
    pub position: Vec3,
    pub scale: f32,
    pub band: Band,
    node: NodeId,
    model: Arc<Model>,
    alive: bool,
}

impl Trash {
    /// Scatter a new piece and add it to the scene.
    pub fn spawn<S, R>(scene: &mut S, template: &Arc<Model>, config: &TrashConfig, rng: &mut R) -> Self
    where
        S: SceneGraph + ?Sized,
        R: Rng,
    {
        let (position, band) = scatter(rng, config);
        Self::spawn_at(scene, template, position, config.scale, band)
    }

    /// Add a piece at a known position.
    pub fn spawn_at<S: SceneGraph + ?Sized>(
        scene: &mut S,
        template: &Arc<Model>,
        position: Vec3,
        scale: f32,
        band: Band,
    ) -> Self {
        let model = Arc::clone(template);
        let node = scene.add(SceneNode {
            label: "trash".into(),
            model: Arc::clone(&model),
            transform: Transform {
                position,
                rotation: Quat::IDENTITY,
                scale: Vec3::splat(scale),
            },
        });
        Self {
            position,
            scale,
            band,
            node,
            model,
            alive: true,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Take the piece out of the scene. Only the first call reaches the
    /// scene graph; later calls return `false`.
    pub fn collect<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        scene.remove(self.node);
        true
    }
}
