//! Axis-aligned bounding boxes

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
///
/// An empty box has `min > max` on every axis so that the first `union`
/// or `grow` replaces it entirely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from its corners
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A box containing nothing
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    /// Smallest box containing every point
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut aabb, p| {
            aabb.grow(p);
            aabb
        })
    }

    /// Whether the box contains no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extend the box to include a point
    pub fn grow(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Smallest box containing both boxes
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half size on each axis
    #[must_use]
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check whether a point lies inside (inclusive)
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Box enclosing the eight transformed corners
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let (a, b) = (self.min, self.max);
        let corners = [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ];
        Self::from_points(corners.into_iter().map(|c| matrix.transform_point3(c)))
    }

    /// Nearest intersection of a ray with the box (slab method).
    ///
    /// Returns the entry point, or the origin itself when it starts inside.
    #[must_use]
    pub fn ray_intersection(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        if self.is_empty() {
            return None;
        }

        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(origin + direction * t_min)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb {
        Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    #[test]
    fn test_empty_union() {
        let empty = Aabb::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.union(&unit()), unit());
        assert_eq!(unit().union(&empty), unit());
    }

    #[test]
    fn test_transformed_translation_and_scale() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 0.0),
        );
        let aabb = unit().transformed(&m);
        assert_eq!(aabb.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn test_transformed_rotation_grows() {
        let m = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let aabb = unit().transformed(&m);
        assert!(aabb.extents().x > 0.7);
        assert!((aabb.extents().y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_ray_hit_and_miss() {
        let aabb = unit();
        let hit = aabb.ray_intersection(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = hit.expect("ray should hit");
        assert!((hit.z - 0.5).abs() < 1e-5);

        assert!(aabb.ray_intersection(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z).is_none());
        assert!(aabb.ray_intersection(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).is_none());
    }

    #[test]
    fn test_ray_from_inside() {
        let origin = Vec3::new(0.1, 0.0, 0.0);
        assert_eq!(unit().ray_intersection(origin, Vec3::X), Some(origin));
    }

    #[test]
    fn test_contains() {
        assert!(unit().contains(Vec3::ZERO));
        assert!(unit().contains(Vec3::splat(0.5)));
        assert!(!unit().contains(Vec3::new(0.6, 0.0, 0.0)));
    }
}
