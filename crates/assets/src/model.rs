use glam::Vec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content-addressed model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub u64);

impl ModelId {
    /// Hash the raw bytes a model was read from.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(head))
    }
}

/// Axis-aligned bounds in model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec3::splat(-0.5),
            max: Vec3::splat(0.5),
        }
    }
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Smallest bounds containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Triangle geometry flattened into model space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, rebasing its indices.
    pub fn extend(&mut self, other: MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }
}

/// A loaded model: what the scene and renderer need from a glTF file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    pub name: String,
    pub meshes: Vec<String>,
    pub base_color: [f32; 4],
    pub bounds: Bounds,
    /// `None` for placeholders; renderers draw a bounds-sized box instead.
    pub geometry: Option<MeshData>,
}

impl Model {
    pub const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

    /// Unit box stand-in used when model files are not available.
    pub fn placeholder(name: &str, base_color: [f32; 4]) -> Self {
        Self {
            id: ModelId::from_bytes(name.as_bytes()),
            name: name.to_string(),
            meshes: vec![format!("{name}_box")],
            base_color,
            bounds: Bounds::default(),
            geometry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_is_content_addressed() {
        assert_eq!(ModelId::from_bytes(b"boat"), ModelId::from_bytes(b"boat"));
        assert_ne!(ModelId::from_bytes(b"boat"), ModelId::from_bytes(b"trash"));
    }

    #[test]
    fn default_bounds_are_unit_box() {
        let b = Bounds::default();
        assert_eq!(b.size(), Vec3::ONE);
        assert_eq!(b.center(), Vec3::ZERO);
    }

    #[test]
    fn bounds_union() {
        let a = Bounds {
            min: Vec3::new(-1.0, 0.0, 0.0),
            max: Vec3::new(0.0, 1.0, 1.0),
        };
        let b = Bounds {
            min: Vec3::new(0.0, -2.0, 0.0),
            max: Vec3::new(3.0, 0.0, 0.5),
        };
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(u.max, Vec3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn placeholder_uses_given_color() {
        let m = Model::placeholder("trash", [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.meshes, vec!["trash_box".to_string()]);
        assert!(m.geometry.is_none());
    }

    #[test]
    fn extending_mesh_rebases_indices() {
        let tri = || MeshData {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
        };
        let mut mesh = tri();
        mesh.extend(tri());
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(MeshData::default().is_empty());
    }
}
