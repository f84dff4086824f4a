//! A scene graph for a small real-time renderer
//!
//! This crate provides:
//! - A node hierarchy stored in a generational pool
//! - Lazy, dirty-flag driven world transform resolution
//! - Deferred add and remove, applied once per frame
//! - Model, camera, light and emitter node kinds
//! - Narrow render seams (shader, mesh, material) for the drawing backend

pub mod math;
pub mod render;
pub mod scene;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::math::Aabb;
    pub use crate::render::{Material, MeshHandle, MeshLibrary, MeshSource, Shader, TextureId};
    pub use crate::scene::{
        CameraLens, LightSource, Model, Node, NodeHandle, NodeId, NodeKind, Scene, SceneConfig,
        SceneError,
    };
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
}
