use std::path::Path;

use ::gltf::mesh::Mode;
use ::gltf::{Gltf, Node};
use glam::{Mat3, Mat4, Vec3};

use crate::AssetError;
use crate::model::{Bounds, MeshData, Model, ModelId};

/// Read a `.gltf` or `.glb` file from disk. External buffers resolve
/// relative to the file.
pub fn load_model_file(path: impl AsRef<Path>) -> Result<Model, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let model = import(&model_name(path), &bytes, path.parent())?;
    tracing::debug!(
        path = %path.display(),
        meshes = model.meshes.len(),
        triangles = model.geometry.as_ref().map_or(0, MeshData::triangle_count),
        "model loaded"
    );
    Ok(model)
}

/// Parse glTF JSON or a binary GLB container held in memory.
///
/// Buffers must be embedded (GLB binary chunk or data URIs).
pub fn parse_model(name: &str, bytes: &[u8]) -> Result<Model, AssetError> {
    import(name, bytes, None)
}

fn import(name: &str, bytes: &[u8], base: Option<&Path>) -> Result<Model, AssetError> {
    let Gltf { document, blob } = Gltf::from_slice(bytes)?;
    let buffers = ::gltf::import_buffers(&document, base, blob)?;

    let meshes = document
        .meshes()
        .map(|mesh| format!("{}_{}", mesh.name().unwrap_or("unnamed"), mesh.index()))
        .collect();

    let base_color = document
        .materials()
        .next()
        .map(|m| m.pbr_metallic_roughness().base_color_factor())
        .unwrap_or(Model::DEFAULT_COLOR);

    let mut flattened = Flattened::default();
    let roots: Vec<Node> = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().collect(),
        None => Vec::new(),
    };
    if roots.is_empty() {
        for mesh in document.meshes() {
            flattened.add_mesh(&mesh, Mat4::IDENTITY, &buffers);
        }
    } else {
        for node in roots {
            flattened.add_node(&node, Mat4::IDENTITY, &buffers);
        }
    }

    Ok(Model {
        id: ModelId::from_bytes(bytes),
        name: name.to_string(),
        meshes,
        base_color,
        bounds: flattened.bounds.unwrap_or_default(),
        geometry: (!flattened.mesh.is_empty()).then_some(flattened.mesh),
    })
}

/// Geometry and bounds gathered from a node tree, baked into model space.
#[derive(Default)]
struct Flattened {
    mesh: MeshData,
    bounds: Option<Bounds>,
}

impl Flattened {
    fn add_node(&mut self, node: &Node, parent: Mat4, buffers: &[::gltf::buffer::Data]) {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            self.add_mesh(&mesh, world, buffers);
        }
        for child in node.children() {
            self.add_node(&child, world, buffers);
        }
    }

    fn add_mesh(&mut self, mesh: &::gltf::Mesh, world: Mat4, buffers: &[::gltf::buffer::Data]) {
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        for primitive in mesh.primitives() {
            let bb = primitive.bounding_box();
            let b = transform_bounds(
                Bounds {
                    min: Vec3::from(bb.min),
                    max: Vec3::from(bb.max),
                },
                world,
            );
            self.bounds = Some(match self.bounds {
                Some(acc) => acc.union(&b),
                None => b,
            });

            if primitive.mode() != Mode::Triangles {
                tracing::debug!(mode = ?primitive.mode(), "skipping non-triangle primitive");
                continue;
            }
            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions
                .map(|p| world.transform_point3(Vec3::from(p)).to_array())
                .collect();
            if positions.is_empty() {
                continue;
            }
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            if indices.iter().any(|&i| i as usize >= positions.len()) {
                tracing::warn!(mesh = mesh.index(), "primitive index out of range, skipped");
                continue;
            }
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(normals) => normals
                    .map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero().to_array())
                    .collect(),
                None => Vec::new(),
            };
            let normals = if normals.len() == positions.len() {
                normals
            } else {
                face_normals(&positions, &indices)
            };

            self.mesh.extend(MeshData {
                positions,
                normals,
                indices: indices[..indices.len() - indices.len() % 3].to_vec(),
            });
        }
    }
}

fn transform_bounds(bounds: Bounds, m: Mat4) -> Bounds {
    let corners = (0..8).map(|i| {
        Vec3::new(
            if i & 1 == 0 { bounds.min.x } else { bounds.max.x },
            if i & 2 == 0 { bounds.min.y } else { bounds.max.y },
            if i & 4 == 0 { bounds.min.z } else { bounds.max.z },
        )
    });
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for c in corners.map(|c| m.transform_point3(c)) {
        min = min.min(c);
        max = max.max(c);
    }
    Bounds { min, max }
}

/// Smooth vertex normals from the triangles that share each vertex.
fn face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(positions[i as usize]));
        let n = (b - a).cross(c - a);
        for &i in tri {
            acc[i as usize] += n;
        }
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

/// `assets/boat/scene.gltf` is named `boat`, not `scene`.
fn model_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    if stem == "scene" {
        if let Some(parent) = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
        {
            return parent.to_string();
        }
    }
    stem.to_string()
}
