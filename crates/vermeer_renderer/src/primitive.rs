//! Triangle primitives and intersection records.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use glam::{Vec2, Vec3};
use vermeer_core::{Material, Vertex};
use vermeer_math::{Aabb, Ray};

/// Padding applied to primitive bounds so axis-thin triangles still have
/// a hittable box.
const BBOX_PAD: f32 = 1e-4;

/// Intersections closer than this are rejected as self-hits.
const T_MIN: f32 = 1e-5;

/// A triangle resolved to world-space vertex data, with cached bounds.
///
/// Owned by the BVH's primitive array; immutable after the build.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub mesh_id: u32,
    pub v0: Vertex,
    pub v1: Vertex,
    pub v2: Vertex,
    bounds: Aabb,
    centroid: Vec3,
}

impl Primitive {
    pub fn new(mesh_id: u32, v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        let mut bounds = Aabb::from_points(&[v0.position, v1.position, v2.position]);
        bounds.min -= Vec3::splat(BBOX_PAD);
        bounds.max += Vec3::splat(BBOX_PAD);

        let centroid = (v0.position + v1.position + v2.position) / 3.0;

        Self {
            mesh_id,
            v0,
            v1,
            v2,
            bounds,
            centroid,
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// On a hit closer than the ray's current `t`, narrows `ray.t` and
    /// fills `hit`; otherwise leaves both untouched.
    pub fn intersect<'a>(
        &self,
        material: &'a Material,
        ray: &mut Ray,
        hit: &mut HitInfo<'a>,
    ) -> bool {
        let p0 = self.v0.position;
        let edge1 = self.v1.position - p0;
        let edge2 = self.v2.position - p0;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);

        // Ray is parallel to the triangle plane.
        if det.abs() < 1e-8 {
            return false;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - p0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(edge1);
        let v = inv_det * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = inv_det * edge2.dot(q);
        if t <= T_MIN || t >= ray.t {
            return false;
        }

        ray.t = t;

        let w = 1.0 - u - v;
        let mut normal = w * self.v0.normal + u * self.v1.normal + v * self.v2.normal;
        if normal.length_squared() < 1e-12 {
            normal = edge1.cross(edge2);
        }
        normal = normal.normalize();
        // Shading normal always faces the incoming ray.
        if normal.dot(ray.direction) > 0.0 {
            normal = -normal;
        }

        hit.normal = normal;
        hit.barycentric = Vec2::new(u, v);
        hit.tex_coord = w * self.v0.tex_coord + u * self.v1.tex_coord + v * self.v2.tex_coord;
        hit.material = material;

        true
    }
}

/// Absorbing placeholder behind `HitInfo::default`.
static DEFAULT_MATERIAL: Material = Material {
    kd: Vec3::ZERO,
    ks: Vec3::ZERO,
    shininess: 1.0,
    transparency: 0.0,
    kd_texture: None,
};

/// Record of the nearest intersection found along a ray.
///
/// Populated only on a successful intersection; lives on the stack for
/// the duration of one traversal.
#[derive(Clone)]
pub struct HitInfo<'a> {
    /// Shading normal, oriented against the incident ray.
    pub normal: Vec3,
    /// Barycentric weights of `v1` and `v2` at the hit.
    pub barycentric: Vec2,
    /// Interpolated texture coordinate.
    pub tex_coord: Vec2,
    /// Material of the mesh the triangle belongs to.
    pub material: &'a Material,
}

impl Default for HitInfo<'_> {
    fn default() -> Self {
        Self {
            normal: Vec3::ZERO,
            barycentric: Vec2::ZERO,
            tex_coord: Vec2::ZERO,
            material: &DEFAULT_MATERIAL,
        }
    }
}
