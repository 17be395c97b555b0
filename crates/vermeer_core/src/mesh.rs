//! Triangle mesh data shared read-only with the renderer.

use glam::{Vec2, Vec3};

use crate::Material;

/// A single mesh vertex.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coord: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// An indexed triangle mesh with a single material.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[u32; 3]>,
    pub material: Material,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<[u32; 3]>, material: Material) -> Self {
        Self {
            vertices,
            triangles,
            material,
        }
    }

    /// A one-triangle mesh with a flat normal and degenerate UVs.
    pub fn single_triangle(v0: Vec3, v1: Vec3, v2: Vec3, material: Material) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize();
        let vertices = vec![
            Vertex::new(v0, normal, Vec2::ZERO),
            Vertex::new(v1, normal, Vec2::X),
            Vertex::new(v2, normal, Vec2::Y),
        ];
        Self::new(vertices, vec![[0, 1, 2]], material)
    }

    /// A quad spanned by two edges from `origin`, as two triangles.
    pub fn quad(origin: Vec3, edge_u: Vec3, edge_v: Vec3, material: Material) -> Self {
        let normal = edge_u.cross(edge_v).normalize();
        let vertices = vec![
            Vertex::new(origin, normal, Vec2::new(0.0, 0.0)),
            Vertex::new(origin + edge_u, normal, Vec2::new(1.0, 0.0)),
            Vertex::new(origin + edge_u + edge_v, normal, Vec2::new(1.0, 1.0)),
            Vertex::new(origin + edge_v, normal, Vec2::new(0.0, 1.0)),
        ];
        Self::new(vertices, vec![[0, 1, 2], [0, 2, 3]], material)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}
