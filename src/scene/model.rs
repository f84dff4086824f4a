//! Renderable model content

use glam::Mat4;

use crate::math::Aabb;
use crate::render::{MODEL_UNIFORM, Material, MeshHandle, Shader, TextureId, WeakMeshHandle};

/// Mesh references and owned material slots of a model node.
///
/// Meshes are borrowed from a [`MeshLibrary`](crate::render::MeshLibrary);
/// a mesh that has been unloaded is skipped when drawing and bounding.
#[derive(Debug, Clone, Default)]
pub struct Model {
    meshes: Vec<WeakMeshHandle>,
    materials: Vec<Material>,
}

impl Model {
    /// Create a model with no meshes or materials
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference a mesh owned by the mesh library
    pub fn add_mesh(&mut self, mesh: &MeshHandle) {
        self.meshes.push(mesh.downgrade());
    }

    /// Append a default material slot and return its index
    pub fn add_material(&mut self) -> usize {
        self.materials.push(Material::default());
        self.materials.len() - 1
    }

    /// Replace a material slot. Out of range indices are ignored.
    pub fn set_material(&mut self, index: usize, material: Material) -> bool {
        match self.materials.get_mut(index) {
            Some(slot) => {
                *slot = material;
                true
            }
            None => false,
        }
    }

    /// Set a texture layer on a material slot. Out of range indices are ignored.
    pub fn set_texture(&mut self, index: usize, layer: usize, texture: Option<TextureId>) -> bool {
        self.materials
            .get_mut(index)
            .is_some_and(|material| material.set_texture(layer, texture))
    }

    /// Material slot by index
    #[must_use]
    pub fn material(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    /// Number of mesh references, including unloaded ones
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of material slots
    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Meshes that are still loaded
    pub fn meshes(&self) -> impl Iterator<Item = MeshHandle> + '_ {
        self.meshes.iter().filter_map(WeakMeshHandle::upgrade)
    }

    /// Union of the loaded meshes' local bounds
    #[must_use]
    pub fn local_bounds(&self) -> Aabb {
        self.meshes()
            .fold(Aabb::empty(), |acc, mesh| acc.union(&mesh.local_bounds()))
    }

    /// Bind the world matrix and draw every loaded mesh. Returns the draw count.
    ///
    /// A model without material slots draws with `fallback`. A mesh whose
    /// material index has no slot draws with whatever is currently bound.
    pub(crate) fn render(&self, world: &Mat4, shader: &mut dyn Shader, fallback: &Material) -> usize {
        shader.set_matrix4(MODEL_UNIFORM, world);

        let mut drawn = 0;
        for mesh in self.meshes() {
            if self.materials.is_empty() {
                fallback.bind(shader);
            } else if let Some(material) = self.materials.get(mesh.material_index()) {
                material.bind(shader);
            }
            mesh.draw();
            drawn += 1;
        }
        drawn
    }

    /// Depth-only pass: world matrix plus shadow casters, no materials.
    pub(crate) fn render_depth(&self, world: &Mat4, shader: &mut dyn Shader) -> usize {
        shader.set_matrix4(MODEL_UNIFORM, world);

        let mut drawn = 0;
        for mesh in self.meshes().filter(|mesh| mesh.casts_shadows()) {
            mesh.draw();
            drawn += 1;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MATERIAL_UNIFORM;
    use crate::render::testing::{CountingMesh, RecordingShader};
    use glam::Vec3;

    #[test]
    fn test_material_slots() {
        let mut model = Model::new();
        assert_eq!(model.add_material(), 0);
        assert_eq!(model.add_material(), 1);

        assert!(model.set_material(1, Material::shiny(Vec3::Y)));
        assert!(!model.set_material(5, Material::default()));
        assert!(model.set_texture(0, 2, Some(TextureId(9))));
        assert!(!model.set_texture(4, 0, Some(TextureId(9))));

        assert_eq!(model.material(1).map(|m| m.shininess), Some(64.0));
        assert_eq!(model.material(0).and_then(|m| m.texture(2)), Some(TextureId(9)));
    }

    #[test]
    fn test_render_uses_fallback_without_materials() {
        let mesh = CountingMesh::unit();
        let handle = MeshHandle::new(mesh.clone());

        let mut model = Model::new();
        model.add_mesh(&handle);

        let mut shader = RecordingShader::default();
        let drawn = model.render(&Mat4::IDENTITY, &mut shader, &Material::default());

        assert_eq!(drawn, 1);
        assert_eq!(mesh.draw_count(), 1);
        assert_eq!(shader.matrices[0].0, MODEL_UNIFORM);
        assert_eq!(shader.uniforms, vec![MATERIAL_UNIFORM.to_string()]);
    }

    #[test]
    fn test_render_skips_out_of_range_material() {
        let handle = MeshHandle::new(CountingMesh::unit().with_material(3));
        let mut model = Model::new();
        model.add_mesh(&handle);
        model.add_material();

        let mut shader = RecordingShader::default();
        assert_eq!(model.render(&Mat4::IDENTITY, &mut shader, &Material::default()), 1);
        assert!(shader.uniforms.is_empty());
    }

    #[test]
    fn test_unloaded_meshes_are_skipped() {
        let kept = MeshHandle::new(CountingMesh::unit());
        let dropped = MeshHandle::new(CountingMesh::unit());

        let mut model = Model::new();
        model.add_mesh(&kept);
        model.add_mesh(&dropped);
        drop(dropped);

        assert_eq!(model.mesh_count(), 2);
        assert_eq!(model.meshes().count(), 1);

        let mut shader = RecordingShader::default();
        assert_eq!(model.render(&Mat4::IDENTITY, &mut shader, &Material::default()), 1);
    }

    #[test]
    fn test_depth_pass_only_draws_casters() {
        let caster = CountingMesh::unit();
        let receiver = CountingMesh::unit().without_shadows();
        let h1 = MeshHandle::new(caster.clone());
        let h2 = MeshHandle::new(receiver.clone());

        let mut model = Model::new();
        model.add_mesh(&h1);
        model.add_mesh(&h2);

        let mut shader = RecordingShader::default();
        assert_eq!(model.render_depth(&Mat4::IDENTITY, &mut shader), 1);
        assert_eq!(caster.draw_count(), 1);
        assert_eq!(receiver.draw_count(), 0);
        assert!(shader.uniforms.is_empty());
    }

    #[test]
    fn test_local_bounds_union() {
        let mut far = CountingMesh::unit();
        far.bounds = Aabb::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(5.0, 1.0, 1.0));
        let h1 = MeshHandle::new(CountingMesh::unit());
        let h2 = MeshHandle::new(far);

        let mut model = Model::new();
        assert!(model.local_bounds().is_empty());
        model.add_mesh(&h1);
        model.add_mesh(&h2);

        let bounds = model.local_bounds();
        assert_eq!(bounds.min, Vec3::splat(-0.5));
        assert_eq!(bounds.max, Vec3::new(5.0, 1.0, 1.0));
    }
}
