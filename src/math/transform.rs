//! TRS composition and decomposition
//!
//! Local transforms are authored as translation, Euler rotation (degrees) and
//! scale. The rotation order is YXZ, `R = Ry * Rx * Rz`, and the composed
//! matrix is `T * R * S`: a point is scaled first, then rotated, then
//! translated.

use glam::{Mat4, Quat, Vec3};

/// Band around `|sin(x)| == 1` that is treated as gimbal lock.
const GIMBAL_LOW: f32 = 0.999;
const GIMBAL_HIGH: f32 = 1.001;

/// Translation, rotation and scale recovered from an affine matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
    /// Translation column
    pub translation: Vec3,
    /// YXZ Euler angles in radians
    pub rotation: Vec3,
    /// Column lengths, X negated for mirrored matrices
    pub scale: Vec3,
}

impl Decomposed {
    /// Rotation converted to degrees.
    #[must_use]
    pub fn rotation_degrees(&self) -> Vec3 {
        to_degrees(self.rotation)
    }
}

/// Quaternion for YXZ Euler angles given in radians.
#[must_use]
pub fn euler_quat(euler_radians: Vec3) -> Quat {
    Quat::from_rotation_y(euler_radians.y)
        * Quat::from_rotation_x(euler_radians.x)
        * Quat::from_rotation_z(euler_radians.z)
}

/// Build `T * R * S` from translation, Euler degrees and scale.
#[must_use]
pub fn compose(translation: Vec3, euler_degrees: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, euler_quat(to_radians(euler_degrees)), translation)
}

/// Split an affine matrix into translation, YXZ Euler radians and scale.
///
/// A zero-length basis column yields a zero scale component and a zero
/// rotation instead of dividing by zero. When the X rotation saturates at
/// +/-90 degrees the Y angle is pinned to zero and the remaining freedom is
/// folded into Z.
#[must_use]
pub fn decompose(matrix: &Mat4) -> Decomposed {
    let translation = matrix.w_axis.truncate();
    let mut scale = Vec3::new(
        matrix.x_axis.truncate().length(),
        matrix.y_axis.truncate().length(),
        matrix.z_axis.truncate().length(),
    );

    if scale.x == 0.0 || scale.y == 0.0 || scale.z == 0.0 {
        return Decomposed {
            translation,
            rotation: Vec3::ZERO,
            scale,
        };
    }

    if matrix.determinant() < 0.0 {
        scale.x = -scale.x;
    }

    let sin_x = -matrix.z_axis.y / scale.z;
    let x = sin_x.clamp(-1.0, 1.0).asin();

    let saturation = sin_x.abs();
    let (y, z) = if saturation > GIMBAL_LOW && saturation < GIMBAL_HIGH {
        (
            0.0,
            (-matrix.y_axis.x / scale.y).atan2(matrix.x_axis.x / scale.x),
        )
    } else {
        (
            (matrix.z_axis.x / scale.z).atan2(matrix.z_axis.z / scale.z),
            (matrix.x_axis.y / scale.x).atan2(matrix.y_axis.y / scale.y),
        )
    };

    Decomposed {
        translation,
        rotation: Vec3::new(x, y, z),
        scale,
    }
}

/// Rotation of `degrees` around `axis`. A zero axis gives the identity.
#[must_use]
pub fn axis_angle(axis: Vec3, degrees: f32) -> Quat {
    match axis.try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, degrees.to_radians()),
        None => Quat::IDENTITY,
    }
}

/// Component-wise degrees to radians.
#[inline]
#[must_use]
pub fn to_radians(degrees: Vec3) -> Vec3 {
    Vec3::new(
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Component-wise radians to degrees.
#[inline]
#[must_use]
pub fn to_degrees(radians: Vec3) -> Vec3 {
    Vec3::new(
        radians.x.to_degrees(),
        radians.y.to_degrees(),
        radians.z.to_degrees(),
    )
}
