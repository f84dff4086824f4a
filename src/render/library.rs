//! Mesh ownership
//!
//! The library is the single strong owner of loaded meshes. Dropping a mesh
//! from the library invalidates every model slot that referenced it.

use rustc_hash::FxHashMap;

use super::mesh::{MeshHandle, MeshSource, WeakMeshHandle};

/// Centralized storage for meshes with optional name-based lookup
#[derive(Debug, Default)]
pub struct MeshLibrary {
    /// Meshes indexed by their handle ID
    meshes: FxHashMap<u64, MeshHandle>,
    /// Name to handle ID mapping for deduplication
    name_to_id: FxHashMap<String, u64>,
}

impl MeshLibrary {
    /// Create a new empty library
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and return a handle to it
    pub fn add(&mut self, mesh: impl MeshSource + 'static) -> MeshHandle {
        let handle = MeshHandle::new(mesh);
        self.meshes.insert(handle.id(), handle.clone());
        handle
    }

    /// Add a mesh under a name. A name that is already loaded returns the
    /// existing mesh and discards the new one.
    pub fn add_named(&mut self, name: impl Into<String>, mesh: impl MeshSource + 'static) -> MeshHandle {
        let name = name.into();

        if let Some(existing) = self.get_by_name(&name) {
            return existing;
        }

        let handle = self.add(mesh);
        self.name_to_id.insert(name, handle.id());
        handle
    }

    /// Get a mesh by its handle ID
    #[must_use]
    pub fn get(&self, id: u64) -> Option<MeshHandle> {
        self.meshes.get(&id).cloned()
    }

    /// Get a mesh by name
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<MeshHandle> {
        self.name_to_id.get(name).and_then(|&id| self.get(id))
    }

    /// Weak reference suitable for a model slot
    #[must_use]
    pub fn weak(&self, id: u64) -> Option<WeakMeshHandle> {
        self.meshes.get(&id).map(MeshHandle::downgrade)
    }

    /// Remove a mesh by ID
    ///
    /// Returns true if the mesh was removed
    pub fn remove(&mut self, id: u64) -> bool {
        if self.meshes.remove(&id).is_some() {
            self.name_to_id.retain(|_, v| *v != id);
            true
        } else {
            false
        }
    }

    /// Get the number of stored meshes
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Check if the library is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Drop every mesh
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.name_to_id.clear();
    }

    /// Iterate over all mesh handles
    pub fn iter(&self) -> impl Iterator<Item = &MeshHandle> + '_ {
        self.meshes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::CountingMesh;

    #[test]
    fn test_add_and_get() {
        let mut library = MeshLibrary::new();
        let handle = library.add(CountingMesh::unit());

        assert_eq!(library.get(handle.id()), Some(handle));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_name_deduplication() {
        let mut library = MeshLibrary::new();
        let first = library.add_named("cube", CountingMesh::unit());
        let second = library.add_named("cube", CountingMesh::unit().with_material(3));

        assert_eq!(first.id(), second.id());
        assert_eq!(second.material_index(), 0);
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_remove_kills_weak_references() {
        let mut library = MeshLibrary::new();
        let id = library.add_named("rock", CountingMesh::unit()).id();
        let weak = library.weak(id).expect("mesh is loaded");

        assert!(library.remove(id));
        assert!(!weak.is_alive());
        assert!(library.get_by_name("rock").is_none());
        assert!(!library.remove(id));
    }
}
