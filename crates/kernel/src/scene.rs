use std::collections::BTreeMap;
use std::sync::Arc;

use driftwood_assets::Model;
use driftwood_common::{NodeId, Transform};

/// A renderable node: a model placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub label: String,
    pub model: Arc<Model>,
    pub transform: Transform,
}

/// The scene graph as the game sees it.
///
/// Entities keep only the `NodeId` they were given by `add`.
pub trait SceneGraph {
    /// Insert a node and return its handle.
    fn add(&mut self, node: SceneNode) -> NodeId;

    /// Remove a node. Removing an unknown or already-removed id is a no-op
    /// that returns `None`.
    fn remove(&mut self, id: NodeId) -> Option<SceneNode>;

    /// Move a node. Returns `false` if the node does not exist.
    fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool;
}

/// Retained scene: a flat set of nodes drawn every frame.
///
/// Uses BTreeMap so renderers see nodes in a stable order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Read-only access to all nodes.
    pub fn nodes(&self) -> &BTreeMap<NodeId, SceneNode> {
        &self.nodes
    }
}

impl SceneGraph for Scene {
    fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId::new();
        tracing::debug!(node = %id.short(), label = %node.label, "scene add");
        self.nodes.insert(id, node);
        id
    }

    fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let removed = self.nodes.remove(&id);
        if removed.is_some() {
            tracing::debug!(node = %id.short(), "scene remove");
        }
        removed
    }

    fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.transform = transform;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn node(label: &str) -> SceneNode {
        SceneNode {
            label: label.into(),
            model: Arc::new(Model::placeholder(label, Model::DEFAULT_COLOR)),
            transform: Transform::default(),
        }
    }

    #[test]
    fn scene_starts_empty() {
        let scene = Scene::new();
        assert!(scene.is_empty());
    }

    #[test]
    fn add_and_remove() {
        let mut scene = Scene::new();
        let id = scene.add(node("boat"));
        assert_eq!(scene.len(), 1);
        assert!(scene.contains(id));

        let removed = scene.remove(id).unwrap();
        assert_eq!(removed.label, "boat");
        assert!(scene.is_empty());
    }

    #[test]
    fn second_remove_is_noop() {
        let mut scene = Scene::new();
        let id = scene.add(node("trash"));
        assert!(scene.remove(id).is_some());
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn set_transform_moves_node() {
        let mut scene = Scene::new();
        let id = scene.add(node("boat"));
        let moved = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..Transform::default()
        };
        assert!(scene.set_transform(id, moved));
        assert_eq!(scene.get(id).unwrap().transform.position, moved.position);
    }

    #[test]
    fn set_transform_unknown_node() {
        let mut scene = Scene::new();
        assert!(!scene.set_transform(NodeId::new(), Transform::default()));
    }

    #[test]
    fn iteration_is_ordered() {
        let mut scene = Scene::new();
        for i in 0..20 {
            scene.add(node(&format!("n{i}")));
        }
        let keys: Vec<NodeId> = scene.nodes().keys().copied().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
