//! Parent/child ownership
//!
//! A child is owned by its parent's children list. Removing a child through
//! any of the `remove_*` calls destroys it together with its subtree; moving
//! a node without destroying it goes through [`Scene::add_child`] (re-parent)
//! or [`Scene::detach`] (back to the pending-add queue).

use super::graph::Scene;
use super::handle::{NodeHandle, NodeId};
use super::node::{Node, Owner};

impl Scene {
    /// Make `child` the last child of `parent`.
    ///
    /// The child leaves its previous owner first. Self-parenting, stale
    /// handles and links that would form a cycle are ignored.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) {
        if parent == child || !self.pool.contains(parent) || !self.pool.contains(child) {
            log::trace!("add_child ignored: {parent} <- {child}");
            return;
        }
        if self.is_ancestor(child, parent) {
            log::trace!("add_child ignored: {child} is an ancestor of {parent}");
            return;
        }

        self.release(child);
        if let Some(node) = self.pool.get_mut(child) {
            node.owner = Owner::Parent(parent);
        }
        if let Some(node) = self.pool.get_mut(parent) {
            node.children.push(child);
        }
        self.mark_dirty(child);
    }

    /// Destroy a direct child and its subtree
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) {
        let owned = self
            .pool
            .get(child)
            .is_some_and(|n| n.owner == Owner::Parent(parent));
        if !owned {
            log::trace!("remove_child ignored: {child} is not a child of {parent}");
            return;
        }
        self.release(child);
        self.destroy_subtree(child);
    }

    /// Destroy a node through its parent. Top-level nodes are left alone.
    pub fn remove_from_parent(&mut self, child: NodeHandle) {
        if let Some(parent) = self.parent(child) {
            self.remove_child(parent, child);
        }
    }

    /// Destroy every child of `parent`
    pub fn remove_all_children(&mut self, parent: NodeHandle) {
        let Some(node) = self.pool.get_mut(parent) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        for child in children {
            self.destroy_subtree(child);
        }
    }

    /// Move a child out of its parent into the pending-add queue.
    ///
    /// The node keeps its subtree and becomes a top-level node at the next
    /// [`update`](Self::update).
    pub fn detach(&mut self, child: NodeHandle) {
        if self.parent(child).is_none() {
            log::trace!("detach ignored: {child} has no parent");
            return;
        }
        self.release(child);
        if let Some(node) = self.pool.get_mut(child) {
            node.owner = Owner::PendingAdd;
        }
        self.nodes_to_add.push(child);
        self.mark_dirty(child);
    }

    /// Unlink a node from whichever list owns it. The owner field is left stale.
    fn release(&mut self, handle: NodeHandle) {
        let Some(owner) = self.pool.get(handle).map(Node::owner) else {
            return;
        };
        let list = match owner {
            Owner::Parent(parent) => match self.pool.get_mut(parent) {
                Some(node) => {
                    node.children.retain(|&mut c| c != handle);
                    return;
                }
                None => return,
            },
            Owner::Live => &mut self.nodes,
            Owner::PendingAdd => &mut self.nodes_to_add,
        };
        list.retain(|&c| c != handle);
    }

    fn is_ancestor(&self, ancestor: NodeHandle, handle: NodeHandle) -> bool {
        let mut cursor = self.parent(handle);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Parent of a node
    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.pool.get(handle).and_then(Node::parent)
    }

    /// Direct children of a node
    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.pool.get(handle).map_or(&[][..], Node::children)
    }

    /// Direct child with this name
    #[must_use]
    pub fn find_child(&self, parent: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.pool.get(c).is_some_and(|n| n.name == name))
    }

    /// Direct child with this id
    #[must_use]
    pub fn find_child_by_id(&self, parent: NodeHandle, id: NodeId) -> Option<NodeHandle> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.pool.get(c).is_some_and(|n| n.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Every existing node appears in exactly one owning list, and that list matches its owner.
    fn assert_single_ownership(scene: &Scene) {
        for (handle, node) in scene.pool.iter() {
            let in_live = scene.nodes.iter().filter(|&&h| h == handle).count();
            let in_pending = scene.nodes_to_add.iter().filter(|&&h| h == handle).count();
            let in_parents: usize = scene
                .pool
                .iter()
                .map(|(_, n)| n.children.iter().filter(|&&h| h == handle).count())
                .sum();

            let owners = in_live + in_pending + in_parents;
            assert_eq!(owners, 1, "{} owned {owners} times", node.name());
            match node.owner() {
                Owner::Live => assert_eq!(in_live, 1),
                Owner::PendingAdd => assert_eq!(in_pending, 1),
                Owner::Parent(parent) => assert!(scene.children(parent).contains(&handle)),
            }
        }
    }

    fn family(scene: &mut Scene) -> (NodeHandle, NodeHandle, NodeHandle) {
        let parent = scene.create_node("P");
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        scene.add_child(parent, a);
        scene.add_child(parent, b);
        scene.update(0.016);
        (parent, a, b)
    }

    #[test]
    fn test_add_child_moves_ownership() {
        let mut scene = Scene::new();
        let (parent, a, b) = family(&mut scene);

        assert_eq!(scene.roots(), &[parent]);
        assert_eq!(scene.children(parent), &[a, b]);
        assert_eq!(scene.parent(a), Some(parent));
        assert_single_ownership(&scene);

        // Re-parent a live top-level node under a child
        let other = scene.create_node("O");
        scene.update(0.016);
        scene.add_child(b, other);
        assert_eq!(scene.roots(), &[parent]);
        assert_eq!(scene.children(b), &[other]);
        assert_single_ownership(&scene);

        // Re-parent between siblings
        scene.add_child(a, other);
        assert!(scene.children(b).is_empty());
        assert_eq!(scene.children(a), &[other]);
        assert_single_ownership(&scene);
    }

    #[test]
    fn test_add_child_rejects_invalid_links() {
        let mut scene = Scene::new();
        let (parent, a, _) = family(&mut scene);
        let grandchild = scene.create_node("G");
        scene.add_child(a, grandchild);

        scene.add_child(a, a);
        scene.add_child(grandchild, parent);
        scene.add_child(a, parent);

        assert_eq!(scene.parent(a), Some(parent));
        assert!(scene.parent(parent).is_none());
        assert_eq!(scene.roots(), &[parent]);
        assert_single_ownership(&scene);
    }

    #[test]
    fn test_remove_child_destroys_subtree() {
        let mut scene = Scene::new();
        let (parent, a, b) = family(&mut scene);
        let grandchild = scene.create_node("G");
        scene.add_child(a, grandchild);
        scene.set_position(b, Vec3::new(0.0, 2.0, 0.0));
        let before = scene.world_position(b).unwrap();

        scene.remove_child(parent, a);

        assert_eq!(scene.children(parent), &[b]);
        assert!(!scene.contains(a));
        assert!(!scene.contains(grandchild));
        assert_eq!(scene.world_position(b), Some(before));
        assert_single_ownership(&scene);

        // Not a child of this parent
        scene.remove_child(b, parent);
        assert!(scene.contains(parent));
    }

    #[test]
    fn test_remove_from_parent() {
        let mut scene = Scene::new();
        let (parent, a, b) = family(&mut scene);

        scene.remove_from_parent(b);
        assert_eq!(scene.children(parent), &[a]);
        assert!(!scene.contains(b));

        scene.remove_from_parent(parent);
        assert!(scene.contains(parent));
    }

    #[test]
    fn test_remove_all_children_destroys() {
        let mut scene = Scene::new();
        let (parent, a, b) = family(&mut scene);

        scene.remove_all_children(parent);
        assert!(scene.children(parent).is_empty());
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert_eq!(scene.node_count(), 1);
        assert_single_ownership(&scene);
    }

    #[test]
    fn test_detach_keeps_subtree() {
        let mut scene = Scene::new();
        let (parent, a, b) = family(&mut scene);
        let grandchild = scene.create_node("G");
        scene.add_child(a, grandchild);
        scene.set_position(parent, Vec3::new(5.0, 0.0, 0.0));

        scene.detach(a);
        assert_eq!(scene.children(parent), &[b]);
        assert!(scene.parent(a).is_none());
        assert!(scene.find_node_by_name("A").is_none());
        assert_single_ownership(&scene);

        // Detached nodes are top-level, so the parent offset no longer applies
        assert!((scene.world_position(grandchild).unwrap() - Vec3::ZERO).length() < 1e-5);

        scene.update(0.016);
        assert_eq!(scene.find_node_by_name("A"), Some(a));
        assert_eq!(scene.children(a), &[grandchild]);
        assert_single_ownership(&scene);

        scene.detach(a);
        assert_eq!(scene.find_node_by_name("A"), Some(a), "top-level nodes stay put");
    }

    #[test]
    fn test_removing_top_level_destroys_children() {
        let mut scene = Scene::new();
        let (parent, a, b) = family(&mut scene);

        scene.remove_node(parent);
        scene.update(0.016);
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_find_child() {
        let mut scene = Scene::new();
        let (parent, a, b) = family(&mut scene);
        let id = scene.node(b).map(Node::id).unwrap();

        assert_eq!(scene.find_child(parent, "A"), Some(a));
        assert_eq!(scene.find_child_by_id(parent, id), Some(b));
        assert!(scene.find_child(parent, "P").is_none());
        assert!(scene.find_child(a, "B").is_none());
        assert!(scene.find_node_by_name("A").is_none(), "scene lookup only sees roots");
    }

    #[test]
    fn test_stale_handle_hierarchy_ops() {
        let mut scene = Scene::new();
        let (parent, a, _) = family(&mut scene);
        scene.remove_child(parent, a);

        scene.add_child(parent, a);
        scene.add_child(a, parent);
        scene.detach(a);
        scene.remove_all_children(a);
        assert!(scene.children(a).is_empty());
        assert!(scene.parent(a).is_none());
        assert_single_ownership(&scene);
    }
}
