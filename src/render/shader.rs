//! Shader binding seam
//!
//! The scene graph never compiles or owns GPU programs. It only pushes
//! per-object state into whatever shader the frame loop hands it.

use glam::Mat4;

/// Uniform name that receives a node's world matrix.
pub const MODEL_UNIFORM: &str = "model";

/// Uniform name that receives a packed [`MaterialUniform`](super::MaterialUniform).
pub const MATERIAL_UNIFORM: &str = "material";

/// Opaque texture reference owned by an external texture manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TextureId(pub u32);

impl TextureId {
    /// The texture manager's fallback texture
    pub const DEFAULT: Self = Self(0);
}

/// A bound shader program that accepts uniforms and texture bindings.
pub trait Shader {
    /// Upload a 4x4 matrix uniform
    fn set_matrix4(&mut self, name: &str, value: &Mat4);

    /// Upload a raw uniform block
    fn set_uniform_bytes(&mut self, name: &str, bytes: &[u8]);

    /// Bind a texture to a unit, or clear the unit with `None`
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);
}
