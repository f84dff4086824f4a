//! Scene registry
//!
//! The [`Scene`] owns every node in a generational pool and keeps three
//! lists on top of it: the live top-level nodes, nodes waiting to be added,
//! and ids waiting to be removed.
//!
//! # Design Principles
//!
//! - **Deferred Structure**: Adds and removes queued during a frame are only
//!   applied by [`Scene::update`], so a node stays valid until the next flush
//! - **Single Owner**: Every node is owned by exactly one of the pending
//!   queue, the live list or a parent's children list
//! - **No Globals**: A scene is an ordinary value; any number can coexist
//!
//! # Example
//!
//! ```ignore
//! let mut scene = Scene::new();
//! let root = scene.create_node("Root");
//!
//! assert!(scene.find_node_by_name("Root").is_none());
//! scene.update(0.016);
//! assert_eq!(scene.find_node_by_name("Root"), Some(root));
//! ```

use std::fmt;

use glam::Mat4;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::config::SceneConfig;
use super::handle::{NodeHandle, NodeId};
use super::node::{Node, NodeKind, Owner};
use super::pool::Pool;
use crate::render::{Material, Shader, TextureId};

// ============================================================================
// Stats
// ============================================================================

/// Transform resolution counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Absolute matrices recomputed
    pub recomputed: u64,
    /// Scene-wide resolution passes
    pub full_passes: u64,
}

// ============================================================================
// Scene
// ============================================================================

/// Root registry of a node hierarchy
pub struct Scene {
    pub(crate) config: SceneConfig,
    pub(crate) pool: Pool<Node>,
    pub(crate) ids: FxHashMap<NodeId, NodeHandle>,
    pub(crate) nodes: Vec<NodeHandle>,
    pub(crate) nodes_to_add: Vec<NodeHandle>,
    nodes_to_remove: Vec<NodeId>,
    shader: Option<Box<dyn Shader>>,
    default_material: Material,
    pub(crate) stats: TransformStats,
}

impl Scene {
    /// Create a scene with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create a scene from a configuration
    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        let mut default_material = Material::new(config.default_color);
        default_material.set_texture(0, Some(TextureId::DEFAULT));

        log::info!("Created scene: {}", config.name);

        Self {
            pool: Pool::with_capacity(config.node_capacity),
            ids: FxHashMap::default(),
            nodes: Vec::new(),
            nodes_to_add: Vec::new(),
            nodes_to_remove: Vec::new(),
            shader: None,
            default_material,
            stats: TransformStats::default(),
            config,
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Creation and removal
    // ------------------------------------------------------------------------

    /// Queue a node for addition. It becomes searchable after the next [`update`](Self::update).
    pub fn add_node(&mut self, mut node: Node) -> NodeHandle {
        if !node.children.is_empty() {
            log::trace!("Dropping {} stale child links of {}", node.children.len(), node.id);
            node.children.clear();
        }
        node.owner = Owner::PendingAdd;
        node.dirty = true;
        node.transformed = true;
        node.cache_valid = false;

        let id = node.id;
        let handle = self.pool.insert(node);
        self.ids.insert(id, handle);
        self.nodes_to_add.push(handle);
        handle
    }

    /// Create and queue a group node
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Create and queue an empty model node
    pub fn create_model(&mut self, name: impl Into<String>) -> NodeHandle {
        self.add_node(Node::model(name))
    }

    /// Queue a node for destruction at the next flush
    pub fn remove_node(&mut self, handle: NodeHandle) {
        match self.pool.get(handle) {
            Some(node) => self.nodes_to_remove.push(node.id),
            None => log::trace!("remove_node ignored for stale handle {handle}"),
        }
    }

    /// Queue a node id for destruction. Unknown ids are ignored at flush time.
    pub fn remove_node_by_id(&mut self, id: NodeId) {
        self.nodes_to_remove.push(id);
    }

    /// Queue the first live node with this name for destruction
    pub fn remove_node_by_name(&mut self, name: &str) {
        if let Some(handle) = self.find_node_by_name(name) {
            self.remove_node(handle);
        }
    }

    /// Alias of [`remove_node`](Self::remove_node) for node-initiated removal
    pub fn mark_for_destroy(&mut self, handle: NodeHandle) {
        self.remove_node(handle);
    }

    /// Destroy every node, including pending and detached ones
    pub fn clear(&mut self) {
        log::info!("Clearing scene {} ({} nodes)", self.config.name, self.pool.len());
        self.pool.clear();
        self.ids.clear();
        self.nodes.clear();
        self.nodes_to_add.clear();
        self.nodes_to_remove.clear();
    }

    /// Free a node and everything below it
    pub(crate) fn destroy_subtree(&mut self, root: NodeHandle) -> usize {
        let mut destroyed = 0;
        let mut stack: SmallVec<[NodeHandle; 32]> = SmallVec::new();
        stack.push(root);

        while let Some(handle) = stack.pop() {
            if let Some(node) = self.pool.remove(handle) {
                self.ids.remove(&node.id);
                stack.extend(node.children.iter().copied());
                destroyed += 1;
            }
        }
        destroyed
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Live top-level node with this id
    #[must_use]
    pub fn find_node_by_id(&self, id: NodeId) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .copied()
            .find(|&h| self.pool.get(h).is_some_and(|n| n.id == id))
    }

    /// First live top-level node with this name
    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .copied()
            .find(|&h| self.pool.get(h).is_some_and(|n| n.name == name))
    }

    /// Handle of any existing node by id, wherever it is owned
    #[must_use]
    pub fn handle_of(&self, id: NodeId) -> Option<NodeHandle> {
        self.ids.get(&id).copied()
    }

    /// Borrow a node
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.pool.get(handle)
    }

    /// Mutably borrow a node's non-structural state
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.pool.get_mut(handle)
    }

    /// Check whether a handle still refers to a node
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.pool.contains(handle)
    }

    /// Live top-level nodes in insertion order
    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.nodes
    }

    /// Number of live top-level nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if there are no live top-level nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of existing nodes at any depth, pending ones included
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.pool.len()
    }

    /// Nodes waiting for the next flush
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.nodes_to_add.len()
    }

    /// Transform resolution counters
    #[must_use]
    pub const fn stats(&self) -> TransformStats {
        self.stats
    }

    // ------------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------------

    /// Apply queued adds, then queued removes, then run every live
    /// top-level node's update hook.
    pub fn update(&mut self, dt: f32) {
        let added = self.flush_adds();
        let removed = self.flush_removes();
        if added + removed > 0 {
            log::debug!(
                "Scene {}: {added} added, {removed} destroyed, {} live",
                self.config.name,
                self.nodes.len()
            );
        }

        for &handle in &self.nodes {
            if let Some(node) = self.pool.get_mut(handle) {
                node.kind.update(dt);
            }
        }
    }

    fn flush_adds(&mut self) -> usize {
        let mut added = 0;
        for handle in std::mem::take(&mut self.nodes_to_add) {
            let Some(node) = self.pool.get_mut(handle) else {
                continue;
            };
            if node.owner == Owner::PendingAdd {
                node.owner = Owner::Live;
                self.nodes.push(handle);
                added += 1;
            }
        }
        added
    }

    fn flush_removes(&mut self) -> usize {
        let mut destroyed = 0;
        for id in std::mem::take(&mut self.nodes_to_remove) {
            let position = self
                .nodes
                .iter()
                .position(|&h| self.pool.get(h).is_some_and(|n| n.id == id));
            match position {
                Some(index) => {
                    let handle = self.nodes.remove(index);
                    destroyed += self.destroy_subtree(handle);
                }
                None => log::trace!("Ignoring removal of unknown node {id}"),
            }
        }
        destroyed
    }

    /// Drain whole particles due on an emitter node
    pub fn take_emissions(&mut self, handle: NodeHandle) -> u32 {
        match self.pool.get_mut(handle).map(|n| &mut n.kind) {
            Some(NodeKind::Emitter(emitter)) => emitter.take(),
            _ => 0,
        }
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Install the shader used by [`render`](Self::render)
    pub fn set_shader(&mut self, shader: Box<dyn Shader>) {
        self.shader = Some(shader);
    }

    /// Remove and return the installed shader
    pub fn take_shader(&mut self) -> Option<Box<dyn Shader>> {
        self.shader.take()
    }

    /// Material used by models without material slots
    #[must_use]
    pub const fn default_material(&self) -> &Material {
        &self.default_material
    }

    /// Mutable default material
    pub fn default_material_mut(&mut self) -> &mut Material {
        &mut self.default_material
    }

    /// Draw every model with the installed shader. Returns the draw count.
    pub fn render(&mut self) -> usize {
        if self.shader.is_none() {
            log::trace!("render skipped: no shader installed");
            return 0;
        }
        self.update_nodes();

        let order = self.render_order();
        let Some(shader) = self.shader.as_deref_mut() else {
            return 0;
        };

        let mut drawn = 0;
        for handle in order {
            if let Some(Node { kind: NodeKind::Model(model), abs, .. }) = self.pool.get(handle) {
                drawn += model.render(abs, shader, &self.default_material);
            }
        }
        drawn
    }

    /// Depth-only pass for shadow maps. Returns the draw count.
    pub fn render_depth(&mut self, shader: &mut dyn Shader) -> usize {
        self.update_nodes();

        let mut drawn = 0;
        for handle in self.render_order() {
            if let Some(Node { kind: NodeKind::Model(model), abs, .. }) = self.pool.get(handle) {
                drawn += model.render_depth(abs, shader);
            }
        }
        drawn
    }

    /// Roots ordered by sort key (stable), each followed by its subtree depth-first.
    fn render_order(&self) -> Vec<NodeHandle> {
        let mut roots = self.nodes.clone();
        roots.sort_by(|a, b| {
            let key = |h: &NodeHandle| self.pool.get(*h).map_or(0.0, Node::sort_key);
            key(a).total_cmp(&key(b))
        });

        if !self.config.recursive_render {
            return roots;
        }

        let mut order = Vec::with_capacity(self.pool.len());
        let mut stack: SmallVec<[NodeHandle; 32]> = SmallVec::new();
        for root in roots {
            stack.push(root);
            while let Some(handle) = stack.pop() {
                let Some(node) = self.pool.get(handle) else {
                    continue;
                };
                order.push(handle);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Inverse world matrix of a camera node
    pub fn view_matrix(&mut self, handle: NodeHandle) -> Option<Mat4> {
        if !matches!(self.pool.get(handle)?.kind, NodeKind::Camera(_)) {
            return None;
        }
        self.ensure_resolved(handle);
        self.pool.get(handle).map(|n| n.abs.inverse())
    }

    /// Projection matrix of a camera node
    #[must_use]
    pub fn projection_matrix(&self, handle: NodeHandle, aspect: f32) -> Option<Mat4> {
        match &self.pool.get(handle)?.kind {
            NodeKind::Camera(lens) => Some(lens.projection(aspect)),
            _ => None,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.config.name)
            .field("live", &self.nodes.len())
            .field("pending_add", &self.nodes_to_add.len())
            .field("pending_remove", &self.nodes_to_remove.len())
            .field("nodes", &self.pool.len())
            .field("has_shader", &self.shader.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
