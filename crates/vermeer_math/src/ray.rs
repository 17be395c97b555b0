//! Ray type shared by the renderer and the acceleration structure.

use glam::Vec3;

/// A ray with an origin, a direction, and the current closest-hit distance.
///
/// `t` starts at a caller-supplied maximum and only ever decreases while a
/// traversal narrows in on the nearest intersection.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub t: f32,
}

impl Ray {
    /// Create a ray with `t` at the far limit.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            t: f32::MAX,
        }
    }

    /// Create a ray from `origin` aimed at `target`, with a unit direction.
    ///
    /// Use this for rays whose `t` is compared against geometric distances
    /// (shadow rays, visibility marches).
    #[inline]
    pub fn towards(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, (target - origin).normalize())
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// The point at the current closest-hit distance.
    #[inline]
    pub fn hit_point(&self) -> Vec3 {
        self.at(self.t)
    }
}
