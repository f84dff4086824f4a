//! Material slots bound before each mesh draw

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::shader::{MATERIAL_UNIFORM, Shader, TextureId};

/// Number of texture layers a material can carry
pub const MAX_TEXTURE_LAYERS: usize = 4;

/// Material properties as laid out for the GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Base color (RGB)
    pub color: [f32; 3],
    /// Padding for alignment
    _padding1: f32,
    /// Specular strength
    pub specular: f32,
    /// Shininess factor
    pub shininess: f32,
    /// Whether to sample the base texture (1.0) or use solid color (0.0)
    pub use_texture: f32,
    /// Padding for alignment
    _padding2: f32,
}

impl MaterialUniform {
    /// Create a new material uniform
    pub fn new(color: Vec3, specular: f32, shininess: f32, use_texture: bool) -> Self {
        Self {
            color: color.into(),
            _padding1: 0.0,
            specular,
            shininess,
            use_texture: if use_texture { 1.0 } else { 0.0 },
            _padding2: 0.0,
        }
    }
}

/// Material definition
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color
    pub color: Vec3,
    /// Specular reflectivity (0.0 - 1.0)
    pub specular: f32,
    /// Shininess exponent
    pub shininess: f32,
    /// Texture per layer; layer N binds to texture unit N
    textures: [Option<TextureId>; MAX_TEXTURE_LAYERS],
}

impl Material {
    /// Create a new material with a color
    pub fn new(color: Vec3) -> Self {
        Self {
            color,
            specular: 0.5,
            shininess: 32.0,
            textures: [None; MAX_TEXTURE_LAYERS],
        }
    }

    /// Create a diffuse material (no specular)
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            specular: 0.0,
            shininess: 1.0,
            ..Self::new(color)
        }
    }

    /// Create a shiny material
    pub fn shiny(color: Vec3) -> Self {
        Self {
            specular: 1.0,
            shininess: 64.0,
            ..Self::new(color)
        }
    }

    /// Assign a texture layer. Layers past [`MAX_TEXTURE_LAYERS`] are ignored.
    pub fn set_texture(&mut self, layer: usize, texture: Option<TextureId>) -> bool {
        match self.textures.get_mut(layer) {
            Some(slot) => {
                *slot = texture;
                true
            }
            None => false,
        }
    }

    /// Texture bound to a layer
    #[must_use]
    pub fn texture(&self, layer: usize) -> Option<TextureId> {
        self.textures.get(layer).copied().flatten()
    }

    /// Convert to uniform data
    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform::new(
            self.color,
            self.specular,
            self.shininess,
            self.textures[0].is_some(),
        )
    }

    /// Push the uniform block and every texture layer into the shader.
    ///
    /// Empty layers are explicitly unbound so textures from the previous
    /// draw do not leak into this one.
    pub fn bind(&self, shader: &mut dyn Shader) {
        shader.set_uniform_bytes(MATERIAL_UNIFORM, bytemuck::bytes_of(&self.to_uniform()));
        for (unit, texture) in (0u32..).zip(self.textures.iter()) {
            shader.bind_texture(unit, *texture);
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec3::new(0.8, 0.8, 0.8))
    }
}
