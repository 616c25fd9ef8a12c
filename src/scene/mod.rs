//! Scene graph: a flat arena of named nodes with parent/child links.
//!
//! Nodes are created once at start-up and live until exit. Assets that
//! arrive asynchronously are held in [`AssetSlot`]s which start
//! [`Pending`](AssetSlot::Pending) and are resolved by the render loop's
//! update step, so the graph only ever changes between frames.

mod compose;
/// Scene materials and their uniform blocks.
pub mod material;
/// Random particle field.
pub mod particles;

use std::sync::Arc;

pub use compose::{compose_scene, SceneHandles};
use glam::{Mat4, Vec3};
pub use material::{BasicMaterial, BlendMode, ParticleMaterial, ParticleUniforms};
pub use particles::{ParticleField, PARTICLE_COUNT, PARTICLE_EXTENT};
use rustc_hash::FxHashMap;

use crate::assets::ModelData;

/// Index of a node in the [`Scene`] arena.
pub type NodeId = usize;

/// Asynchronously loaded value.
#[derive(Debug)]
pub enum AssetSlot<T> {
    /// Load requested, not complete.
    Pending,
    /// Loaded and usable.
    Ready(Arc<T>),
    /// Load failed; the reason is kept for diagnostics.
    Failed(String),
}

// Manual impl: `T` itself need not be `Clone`.
impl<T> Clone for AssetSlot<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Ready(value) => Self::Ready(Arc::clone(value)),
            Self::Failed(reason) => Self::Failed(reason.clone()),
        }
    }
}

impl<T> AssetSlot<T> {
    /// The loaded value, if any.
    #[must_use]
    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the load is still outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Failure reason, if the load failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Ambient light parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB color.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
}

/// A model node: geometry slot plus the shared material.
#[derive(Debug, Clone)]
pub struct ModelNode {
    /// Imported meshes.
    pub geometry: AssetSlot<ModelData>,
    /// Material applied to every mesh primitive.
    pub material: BasicMaterial,
}

/// What a node is.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure grouping node.
    Group,
    /// Camera placeholder; the live camera is owned by the app context.
    Camera,
    /// Ambient light.
    AmbientLight(AmbientLight),
    /// Textured model.
    Model(ModelNode),
    /// Particle sprites.
    Particles(ParticleField),
}

/// One scene graph node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique node name.
    pub name: String,
    /// Transform relative to the parent.
    pub transform: Mat4,
    /// Node payload.
    pub kind: NodeKind,
    /// Child node ids.
    pub children: Vec<NodeId>,
}

impl Node {
    /// Whether the node has something the renderer can draw now.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        match &self.kind {
            NodeKind::Model(model) => model.geometry.ready().is_some(),
            NodeKind::Particles(field) => !field.is_empty(),
            _ => false,
        }
    }
}

/// The scene graph. Node 0 is always the root group.
pub struct Scene {
    nodes: Vec<Node>,
    by_name: FxHashMap<String, NodeId>,
    /// Monotonically increasing generation; bumped on any mutation.
    generation: u64,
    /// Generation that was last consumed by the renderer.
    rendered_generation: u64,
}

impl Scene {
    /// Name of the root node.
    pub const ROOT_NAME: &'static str = "root";

    /// Create a scene holding only the root group.
    #[must_use]
    pub fn new() -> Self {
        let mut by_name = FxHashMap::default();
        let _ = by_name.insert(Self::ROOT_NAME.to_owned(), 0);
        Self {
            nodes: vec![Node {
                name: Self::ROOT_NAME.to_owned(),
                transform: Mat4::IDENTITY,
                kind: NodeKind::Group,
                children: Vec::new(),
            }],
            by_name,
            generation: 1,
            rendered_generation: 0,
        }
    }

    /// Root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        0
    }

    /// Add a node under `parent`. Returns `None` if `parent` does not exist
    /// or `name` is taken.
    pub fn add(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
    ) -> Option<NodeId> {
        if parent >= self.nodes.len() || self.by_name.contains_key(name) {
            return None;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_owned(),
            transform: Mat4::IDENTITY,
            kind,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        let _ = self.by_name.insert(name.to_owned(), id);
        self.invalidate();
        Some(id)
    }

    /// Look up a node id by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Borrow a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutably borrow a node; marks the scene dirty.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id < self.nodes.len() {
            self.invalidate();
        }
        self.nodes.get_mut(id)
    }

    /// Total number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk the graph depth-first from the root, yielding each node with its
    /// accumulated world transform.
    #[must_use]
    pub fn walk(&self) -> Vec<(NodeId, Mat4)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root(), Mat4::IDENTITY)];
        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let world = parent * node.transform;
            out.push((id, world));
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
        out
    }

    /// Particle field stored under `name`.
    #[must_use]
    pub fn particles(&self, name: &str) -> Option<&ParticleField> {
        match &self.node(self.find(name)?)?.kind {
            NodeKind::Particles(field) => Some(field),
            _ => None,
        }
    }

    /// Mutable particle field stored under `name`.
    pub fn particles_mut(&mut self, name: &str) -> Option<&mut ParticleField> {
        let id = self.find(name)?;
        match &mut self.node_mut(id)?.kind {
            NodeKind::Particles(field) => Some(field),
            _ => None,
        }
    }

    /// Model node stored under `name`.
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&ModelNode> {
        match &self.node(self.find(name)?)?.kind {
            NodeKind::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Mutable model node stored under `name`.
    pub fn model_mut(&mut self, name: &str) -> Option<&mut ModelNode> {
        let id = self.find(name)?;
        match &mut self.node_mut(id)?.kind {
            NodeKind::Model(model) => Some(model),
            _ => None,
        }
    }

    /// First ambient light in the graph.
    #[must_use]
    pub fn ambient_light(&self) -> Option<AmbientLight> {
        self.nodes.iter().find_map(|node| match node.kind {
            NodeKind::AmbientLight(light) => Some(light),
            _ => None,
        })
    }

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Current mutation generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether scene data changed since last `mark_rendered()`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Record that the renderer has consumed the current generation.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scene_has_only_root() {
        let scene = Scene::new();
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.find("root"), Some(0));
        assert!(scene.is_dirty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut scene = Scene::new();
        assert!(scene.add(0, "a", NodeKind::Group).is_some());
        assert!(scene.add(0, "a", NodeKind::Group).is_none());
        assert!(scene.add(99, "b", NodeKind::Group).is_none());
    }

    #[test]
    fn walk_accumulates_transforms() {
        let mut scene = Scene::new();
        let a = scene.add(0, "a", NodeKind::Group).unwrap();
        let b = scene.add(a, "b", NodeKind::Group).unwrap();
        scene.node_mut(a).unwrap().transform =
            Mat4::from_translation(Vec3::X);
        scene.node_mut(b).unwrap().transform =
            Mat4::from_translation(Vec3::Y);

        let walked = scene.walk();
        assert_eq!(walked.iter().map(|(id, _)| *id).collect::<Vec<_>>(), [0, a, b]);
        let world_b = walked[2].1;
        assert_eq!(world_b.transform_point3(Vec3::ZERO), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn mutation_marks_dirty_until_rendered() {
        let mut scene = Scene::new();
        scene.mark_rendered();
        assert!(!scene.is_dirty());
        let _ = scene.add(0, "light", NodeKind::Group);
        assert!(scene.is_dirty());
        scene.mark_rendered();
        let _ = scene.node(0);
        assert!(!scene.is_dirty());
    }

    #[test]
    fn pending_model_is_not_drawable() {
        let mut scene = Scene::new();
        let id = scene
            .add(
                0,
                "model",
                NodeKind::Model(ModelNode {
                    geometry: AssetSlot::Pending,
                    material: BasicMaterial::new(),
                }),
            )
            .unwrap();
        assert!(!scene.node(id).unwrap().is_drawable());

        scene.model_mut("model").unwrap().geometry =
            AssetSlot::Ready(Arc::new(ModelData::default()));
        assert!(scene.node(id).unwrap().is_drawable());
    }

    #[test]
    fn slot_accessors() {
        let failed: AssetSlot<u8> = AssetSlot::Failed("boom".to_owned());
        assert_eq!(failed.failure(), Some("boom"));
        assert!(failed.ready().is_none());
        assert!(!failed.clone().is_pending());
    }
}
