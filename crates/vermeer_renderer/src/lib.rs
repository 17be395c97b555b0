//! Vermeer renderer - offline CPU ray tracing.
//!
//! BVH-accelerated triangle intersection, stochastic area-light
//! integration and depth-bounded recursive shading.

mod bucket;
mod bvh;
mod camera;
mod environment;
mod integrator;
mod light;
mod primitive;
mod renderer;
mod sampler;
mod shading;
mod split;
mod visibility;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhConfig, SplitPolicy};
pub use camera::Camera;
pub use environment::sample_environment_map;
pub use integrator::render_ray;
pub use light::{
    compute_light_contribution, sample_parallelogram_light, sample_segment_light, LightSample,
};
pub use primitive::{HitInfo, Primitive};
pub use renderer::{
    color_to_rgba, linear_to_gamma, render, render_pixel, ImageBuffer, RenderConfig, RenderState,
};
pub use sampler::Sampler;
pub use shading::compute_shading;
pub use split::{split_by_median, split_by_sah_bins};
pub use visibility::{visibility_binary, visibility_transparency, visible_light};

/// Re-export the scene and math types the public API is built from.
pub use vermeer_core::{
    Color, Features, Light, Material, Mesh, ParallelogramLight, PointLight, Scene, SegmentLight,
    Texture, Vertex,
};
pub use vermeer_math::{Aabb, Ray, Vec2, Vec3};
