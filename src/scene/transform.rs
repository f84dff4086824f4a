//! Node transforms and dirty resolution
//!
//! Every node keeps a relative matrix that callers write, and an absolute
//! matrix that is derived from it:
//!
//! ```text
//! abs = parent.abs * rel    (rel alone for top-level nodes)
//! ```
//!
//! # Design Principles
//!
//! - **Lazy**: Writes only flag nodes dirty; absolute matrices are rebuilt on
//!   demand by a top-down pass
//! - **Always Current Reads**: Every world-space reader resolves a dirty node
//!   before answering
//! - **Iterative**: Every walk uses an explicit stack, so hierarchy depth is
//!   bounded by memory, not by the call stack
//!
//! Marking a node dirty runs four steps:
//!
//! 1. flag the node and its subtree dirty and drop the TRS cache
//! 2. resolve the subtree against the parent's current absolute matrix
//! 3. flag every ancestor dirty, without resolving them
//! 4. flag the node and its subtree dirty again
//!
//! Step 4 means a node is never clean under a dirty ancestor, so the next
//! scene-wide pass reaches every stale node.

use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use super::graph::Scene;
use super::handle::NodeHandle;
use super::node::{Node, NodeKind, Owner, Trs};
use crate::math;

type Stack = SmallVec<[NodeHandle; 32]>;

// ============================================================================
// Resolution
// ============================================================================

impl Scene {
    /// Resolve every live node's subtree now
    pub fn update_nodes(&mut self) {
        self.stats.full_passes += 1;
        for index in 0..self.nodes.len() {
            let root = self.nodes[index];
            self.update_tree(root);
        }
    }

    /// Rebuild dirty absolute matrices below `root`. Clean nodes end the walk.
    pub(crate) fn update_tree(&mut self, root: NodeHandle) {
        let mut stack: Stack = SmallVec::new();
        stack.push(root);

        while let Some(handle) = stack.pop() {
            let parent_abs = self.parent_abs(handle);
            let Some(node) = self.pool.get_mut(handle) else {
                continue;
            };
            if !node.dirty {
                continue;
            }

            node.abs = parent_abs * node.rel;
            node.dirty = false;
            if let NodeKind::Model(model) = &node.kind {
                node.bounds = model.local_bounds().transformed(&node.abs);
            }
            self.stats.recomputed += 1;
            stack.extend(node.children.iter().rev().copied());
        }
    }

    pub(crate) fn mark_dirty(&mut self, handle: NodeHandle) {
        let Some(node) = self.pool.get_mut(handle) else {
            return;
        };
        node.cache_valid = false;

        self.mark_subtree(handle);
        self.update_tree(handle);

        let mut cursor = self.pool.get(handle).and_then(Node::parent);
        while let Some(ancestor) = cursor {
            let Some(node) = self.pool.get_mut(ancestor) else {
                break;
            };
            node.dirty = true;
            cursor = node.parent();
        }

        self.mark_subtree(handle);
    }

    fn mark_subtree(&mut self, root: NodeHandle) {
        let mut stack: Stack = SmallVec::new();
        stack.push(root);

        while let Some(handle) = stack.pop() {
            if let Some(node) = self.pool.get_mut(handle) {
                node.dirty = true;
                node.transformed = true;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Bring a node's absolute matrix up to date. Returns false for stale handles.
    pub(crate) fn ensure_resolved(&mut self, handle: NodeHandle) -> bool {
        match self.pool.get(handle) {
            None => return false,
            Some(node) if !node.dirty => return true,
            Some(_) => {}
        }

        self.update_nodes();

        // Pending nodes are not reachable from the live list
        if self.pool.get(handle).is_some_and(|n| n.dirty) {
            let top = self.topmost(handle);
            self.update_tree(top);
        }
        true
    }

    fn parent_abs(&self, handle: NodeHandle) -> Mat4 {
        match self.pool.get(handle).map(Node::owner) {
            Some(Owner::Parent(parent)) => self.pool.get(parent).map_or(Mat4::IDENTITY, |p| p.abs),
            _ => Mat4::IDENTITY,
        }
    }

    pub(crate) fn topmost(&self, handle: NodeHandle) -> NodeHandle {
        let mut top = handle;
        while let Some(parent) = self.pool.get(top).and_then(Node::parent) {
            top = parent;
        }
        top
    }

    /// Read and clear the node's transformed flag
    pub fn take_transformed(&mut self, handle: NodeHandle) -> bool {
        self.pool
            .get_mut(handle)
            .is_some_and(|node| std::mem::replace(&mut node.transformed, false))
    }
}

// ============================================================================
// Local transform
// ============================================================================

impl Scene {
    /// Rebuild the relative matrix from translation, Euler degrees and scale
    pub fn set_transform(&mut self, handle: NodeHandle, translation: Vec3, rotation: Vec3, scale: Vec3) {
        self.set_transform_matrix(handle, math::compose(translation, rotation, scale));
    }

    /// Replace the relative matrix
    pub fn set_transform_matrix(&mut self, handle: NodeHandle, matrix: Mat4) {
        match self.pool.get_mut(handle) {
            Some(node) => {
                node.rel = matrix;
                self.mark_dirty(handle);
            }
            None => log::trace!("set_transform ignored for stale handle {handle}"),
        }
    }

    /// Decomposed relative transform with rotation in degrees
    pub fn transform(&mut self, handle: NodeHandle) -> Option<Trs> {
        if !self.ensure_resolved(handle) {
            return None;
        }
        let node = self.pool.get_mut(handle)?;
        if !node.cache_valid {
            let parts = math::decompose(&node.rel);
            node.cache = Trs {
                position: parts.translation,
                rotation: parts.rotation_degrees(),
                scale: parts.scale,
            };
            node.cache_valid = true;
        }
        Some(node.cache)
    }

    /// Relative and absolute matrices, resolved
    pub fn transform_matrices(&mut self, handle: NodeHandle) -> Option<(Mat4, Mat4)> {
        if !self.ensure_resolved(handle) {
            return None;
        }
        self.pool.get(handle).map(|n| (n.rel, n.abs))
    }

    /// Local position
    pub fn position(&mut self, handle: NodeHandle) -> Option<Vec3> {
        self.transform(handle).map(|t| t.position)
    }

    /// Local Euler rotation in degrees
    pub fn rotation(&mut self, handle: NodeHandle) -> Option<Vec3> {
        self.transform(handle).map(|t| t.rotation)
    }

    /// Local scale
    pub fn scale(&mut self, handle: NodeHandle) -> Option<Vec3> {
        self.transform(handle).map(|t| t.scale)
    }

    pub fn set_position(&mut self, handle: NodeHandle, position: Vec3) {
        if let Some(t) = self.transform(handle) {
            self.set_transform(handle, position, t.rotation, t.scale);
        }
    }

    pub fn set_rotation(&mut self, handle: NodeHandle, degrees: Vec3) {
        if let Some(t) = self.transform(handle) {
            self.set_transform(handle, t.position, degrees, t.scale);
        }
    }

    pub fn set_scale(&mut self, handle: NodeHandle, scale: Vec3) {
        if let Some(t) = self.transform(handle) {
            self.set_transform(handle, t.position, t.rotation, scale);
        }
    }

    /// Move by an offset in parent space
    pub fn translate(&mut self, handle: NodeHandle, delta: Vec3) {
        if let Some(t) = self.transform(handle) {
            self.set_transform(handle, t.position + delta, t.rotation, t.scale);
        }
    }

    /// Add Euler degrees to the local rotation
    pub fn rotate(&mut self, handle: NodeHandle, degrees: Vec3) {
        if let Some(t) = self.transform(handle) {
            self.set_transform(handle, t.position, t.rotation + degrees, t.scale);
        }
    }

    /// Multiply the local scale per axis
    pub fn scale_by(&mut self, handle: NodeHandle, factor: Vec3) {
        if let Some(t) = self.transform(handle) {
            self.set_transform(handle, t.position, t.rotation, t.scale * factor);
        }
    }

    /// Step the local position toward `target` by `speed` (1.0 snaps)
    pub fn set_position_smooth(&mut self, handle: NodeHandle, target: Vec3, speed: f32) {
        if let Some(current) = self.position(handle) {
            self.set_position(handle, current + (target - current) * speed);
        }
    }

    /// Slerp the local rotation toward `target` degrees; `t` is clamped to `[0, 1]`
    pub fn set_rotation_smooth(&mut self, handle: NodeHandle, target: Vec3, t: f32) {
        if let Some(current) = self.rotation(handle) {
            let from = math::euler_quat(math::to_radians(current));
            let to = math::euler_quat(math::to_radians(target));
            let blended = from.slerp(to, t.clamp(0.0, 1.0));
            self.set_rotation(handle, quat_degrees(blended));
        }
    }
}

fn quat_degrees(rotation: Quat) -> Vec3 {
    math::decompose(&Mat4::from_quat(rotation)).rotation_degrees()
}

// ============================================================================
// World space
// ============================================================================

impl Scene {
    /// World-space position (translation of the absolute matrix)
    pub fn world_position(&mut self, handle: NodeHandle) -> Option<Vec3> {
        self.world_matrix(handle).map(|m| m.w_axis.truncate())
    }

    /// Resolved absolute matrix
    pub fn world_matrix(&mut self, handle: NodeHandle) -> Option<Mat4> {
        if !self.ensure_resolved(handle) {
            return None;
        }
        self.pool.get(handle).map(|n| n.abs)
    }

    /// World-space Euler rotation in degrees
    pub fn world_rotation(&mut self, handle: NodeHandle) -> Option<Vec3> {
        self.world_matrix(handle)
            .map(|m| math::decompose(&m).rotation_degrees())
    }

    /// Move the node so its world position becomes `world`
    pub fn set_world_position(&mut self, handle: NodeHandle, world: Vec3) {
        if !self.ensure_resolved(handle) {
            log::trace!("set_world_position ignored for stale handle {handle}");
            return;
        }
        let local = self.parent_abs(handle).inverse().transform_point3(world);
        self.set_position(handle, local);
    }

    /// Rotate the node so its world rotation becomes `degrees`
    pub fn set_world_rotation(&mut self, handle: NodeHandle, degrees: Vec3) {
        if !self.ensure_resolved(handle) {
            return;
        }
        let parent = math::decompose(&self.parent_abs(handle));
        let parent_rotation = math::euler_quat(parent.rotation);
        let world = math::euler_quat(math::to_radians(degrees));
        self.set_rotation(handle, quat_degrees(parent_rotation.inverse() * world));
    }

    /// Map a world-space point into the node's local space
    pub fn world_to_local(&mut self, handle: NodeHandle, point: Vec3) -> Option<Vec3> {
        self.world_matrix(handle)
            .map(|m| m.inverse().transform_point3(point))
    }

    /// Map a local point into world space
    pub fn local_to_world(&mut self, handle: NodeHandle, point: Vec3) -> Option<Vec3> {
        self.world_matrix(handle).map(|m| m.transform_point3(point))
    }

    /// World-space -Z axis
    pub fn forward(&mut self, handle: NodeHandle) -> Option<Vec3> {
        self.world_axis(handle, Vec3::NEG_Z)
    }

    /// World-space +X axis
    pub fn right(&mut self, handle: NodeHandle) -> Option<Vec3> {
        self.world_axis(handle, Vec3::X)
    }

    /// World-space +Y axis
    pub fn up(&mut self, handle: NodeHandle) -> Option<Vec3> {
        self.world_axis(handle, Vec3::Y)
    }

    fn world_axis(&mut self, handle: NodeHandle, axis: Vec3) -> Option<Vec3> {
        self.world_matrix(handle)
            .map(|m| m.transform_vector3(axis).normalize_or_zero())
    }

    /// Orbit around `pivot` and spin by the same axis and angle
    pub fn rotate_around(&mut self, handle: NodeHandle, pivot: Vec3, axis: Vec3, degrees: f32) {
        let Some(position) = self.world_position(handle) else {
            return;
        };
        let orbit = math::axis_angle(axis, degrees);
        self.set_world_position(handle, pivot + orbit * (position - pivot));
        self.rotate(handle, axis.normalize_or_zero() * degrees);
    }

    /// Turn the node so its forward axis points at `target`
    pub fn look_at(&mut self, handle: NodeHandle, target: Vec3, up: Vec3) {
        let Some(position) = self.world_position(handle) else {
            return;
        };
        let direction = target - position;
        if direction.length_squared() < f32::EPSILON || direction.cross(up).length_squared() < f32::EPSILON {
            log::trace!("look_at ignored for degenerate direction on {handle}");
            return;
        }
        let facing = Mat4::look_at_rh(position, target, up).inverse();
        self.set_world_rotation(handle, math::decompose(&facing).rotation_degrees());
    }

    /// Turn the node toward another node's world position
    pub fn look_at_node(&mut self, handle: NodeHandle, target: NodeHandle, up: Vec3) {
        if let Some(point) = self.world_position(target) {
            self.look_at(handle, point, up);
        }
    }

    /// Ray test against a model node's world bounds. Other kinds never hit.
    pub fn check_intersection(&mut self, handle: NodeHandle, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        if !self.ensure_resolved(handle) {
            return None;
        }
        let node = self.pool.get(handle)?;
        let NodeKind::Model(model) = &node.kind else {
            return None;
        };
        model
            .local_bounds()
            .transformed(&node.abs)
            .ray_intersection(origin, direction)
    }
}

// ============================================================================
// Tests
// ============================================================================
