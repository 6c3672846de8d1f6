use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle to a node held by a scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for logs and debug output.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Transform rotated `heading` radians about +Y with a uniform scale.
    pub fn from_heading(position: Vec3, heading: f32, scale: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(heading),
            scale: Vec3::splat(scale),
        }
    }
}

/// Unit vector a node faces after turning `heading` radians about +Y.
///
/// Nodes face their local +X axis, so heading 0 points along world +X and
/// positive headings turn towards -Z.
pub fn heading_forward(heading: f32) -> Vec3 {
    Quat::from_rotation_y(heading) * Vec3::X
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_uniqueness() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn node_id_short_form() {
        assert_eq!(NodeId::new().short().len(), 8);
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn heading_zero_faces_plus_x() {
        let f = heading_forward(0.0);
        assert!((f - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn quarter_turn_faces_minus_z() {
        let f = heading_forward(std::f32::consts::FRAC_PI_2);
        assert!((f - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn from_heading_matches_forward() {
        let t = Transform::from_heading(Vec3::new(1.0, 2.0, 3.0), 1.5, 3.0);
        let f = t.rotation * Vec3::X;
        assert!((f - heading_forward(1.5)).length() < 1e-6);
        assert_eq!(t.scale, Vec3::splat(3.0));
    }
}
