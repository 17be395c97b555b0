//! Vermeer core - immutable scene data shared by the renderer.
//!
//! This crate provides:
//!
//! - **Geometry**: `Vertex`, `Mesh`
//! - **Surface appearance**: `Material`, `Texture`
//! - **Light sources**: the closed `Light` sum type
//! - **Configuration**: the `Features` flag set
//!
//! Everything here is plain data; all behavior lives in the renderer.

pub mod features;
pub mod light;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use features::Features;
pub use light::{Light, ParallelogramLight, PointLight, SegmentLight};
pub use material::{Color, Material};
pub use mesh::{Mesh, Vertex};
pub use scene::Scene;
pub use texture::{Texture, TextureError};
