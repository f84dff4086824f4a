//! Math helpers layered over glam
//!
//! glam supplies the matrix, quaternion and vector value types. This module
//! adds the engine's Euler convention and bounding volumes.

mod bounds;
mod transform;

pub use bounds::Aabb;
pub use transform::{
    Decomposed, axis_angle, compose, decompose, euler_quat, to_degrees, to_radians,
};
