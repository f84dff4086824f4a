//! Render collaborators
//!
//! The narrow surface the scene graph talks to when drawing: a shader that
//! accepts uniforms, meshes behind weak handles, and material slots.

mod library;
mod material;
mod mesh;
mod shader;

pub use library::MeshLibrary;
pub use material::{MAX_TEXTURE_LAYERS, Material, MaterialUniform};
pub use mesh::{MeshHandle, MeshSource, WeakMeshHandle};
pub use shader::{MATERIAL_UNIFORM, MODEL_UNIFORM, Shader, TextureId};
