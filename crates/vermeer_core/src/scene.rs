//! Scene aggregation: geometry, lights, environment.

use std::sync::Arc;

use crate::{Light, Mesh, Texture};

/// A renderable scene. Immutable for the duration of a render.
#[derive(Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub lights: Vec<Light>,
    /// Cross-layout environment atlas, sampled on ray misses.
    pub environment: Option<Arc<Texture>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}
