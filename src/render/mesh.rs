//! Mesh handles
//!
//! Meshes are owned by a mesh library. Models only keep weak handles, so a
//! mesh that is unloaded simply stops being drawn.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::math::Aabb;

/// Global counter for generating unique mesh IDs
static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed)
}

/// Drawable geometry provided by the mesh/GPU layer.
pub trait MeshSource: Send + Sync {
    /// Index into the owning model's material slots
    fn material_index(&self) -> usize {
        0
    }

    /// Whether the mesh is drawn into shadow maps
    fn casts_shadows(&self) -> bool {
        true
    }

    /// Bounds in mesh-local space
    fn local_bounds(&self) -> Aabb;

    /// Issue the draw call with whatever state is currently bound
    fn draw(&self);
}

/// A strong handle to a mesh.
///
/// The mesh stays alive as long as at least one strong handle exists.
#[derive(Clone)]
pub struct MeshHandle {
    id: u64,
    inner: Arc<dyn MeshSource>,
}

impl MeshHandle {
    /// Wrap a mesh in a new handle
    #[must_use]
    pub fn new(mesh: impl MeshSource + 'static) -> Self {
        Self {
            id: next_id(),
            inner: Arc::new(mesh),
        }
    }

    /// Get the unique ID of this mesh
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Create a weak handle that doesn't keep the mesh alive
    #[must_use]
    pub fn downgrade(&self) -> WeakMeshHandle {
        WeakMeshHandle {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Get the strong reference count
    #[must_use]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl std::fmt::Debug for MeshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshHandle").field("id", &self.id).finish()
    }
}

impl PartialEq for MeshHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MeshHandle {}

impl Hash for MeshHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::ops::Deref for MeshHandle {
    type Target = dyn MeshSource;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

/// A weak handle to a mesh that doesn't prevent cleanup.
#[derive(Clone)]
pub struct WeakMeshHandle {
    id: u64,
    inner: Weak<dyn MeshSource>,
}

impl WeakMeshHandle {
    /// Get the unique ID of this mesh
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Attempt to upgrade to a strong handle.
    ///
    /// Returns `None` if the mesh has been dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<MeshHandle> {
        self.inner
            .upgrade()
            .map(|inner| MeshHandle { id: self.id, inner })
    }

    /// Check if the mesh is still alive
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl std::fmt::Debug for WeakMeshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakMeshHandle")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl PartialEq for WeakMeshHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WeakMeshHandle {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::CountingMesh;

    #[test]
    fn test_handle_clone_shares_id() {
        let handle1 = MeshHandle::new(CountingMesh::unit());
        let handle2 = handle1.clone();
        assert_eq!(handle1, handle2);
        assert_eq!(handle1.strong_count(), 2);
    }

    #[test]
    fn test_weak_upgrade() {
        let strong = MeshHandle::new(CountingMesh::unit());
        let weak = strong.downgrade();

        assert!(weak.is_alive());
        let upgraded = weak.upgrade();
        assert_eq!(upgraded.as_ref().map(MeshHandle::id), Some(strong.id()));

        drop(strong);
        drop(upgraded);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_deref_reaches_mesh() {
        let handle = MeshHandle::new(CountingMesh::unit().with_material(2));
        assert_eq!(handle.material_index(), 2);
        assert!(handle.casts_shadows());
    }
}
