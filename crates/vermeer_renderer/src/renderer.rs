//! Render driver: shared state, configuration, the parallel bucket loop
//! and image output.

use rayon::prelude::*;
use vermeer_core::{Color, Features, Scene};

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::integrator::render_ray;
use crate::sampler::Sampler;

/// Everything one ray evaluation reads, plus its private sampler.
///
/// Scene, features and BVH are shared read-only across all threads; the
/// sampler cursor is the only thing that advances.
pub struct RenderState<'a> {
    pub scene: &'a Scene,
    pub features: &'a Features,
    pub bvh: &'a Bvh,
    pub sampler: Sampler,
}

impl<'a> RenderState<'a> {
    pub fn new(scene: &'a Scene, features: &'a Features, bvh: &'a Bvh, sampler: Sampler) -> Self {
        Self {
            scene,
            features,
            bvh,
            sampler,
        }
    }
}

/// Render output settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Jittered camera rays per pixel.
    pub samples_per_pixel: u32,
    pub bucket_size: u32,
    /// Base seed; each bucket derives its own sampler stream from it.
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            samples_per_pixel: 16,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    state: &mut RenderState,
    x: u32,
    y: u32,
    samples_per_pixel: u32,
) -> Color {
    let samples = samples_per_pixel.max(1);

    let mut pixel_color = Color::ZERO;
    for _ in 0..samples {
        let jitter = state.sampler.next_2d();
        let mut ray = camera.get_ray(x, y, jitter);
        pixel_color += render_ray(state, &mut ray, 0);
    }

    pixel_color / samples as f32
}

/// Render the scene into an image buffer, bucket-parallel.
///
/// The BVH must be fully built before this is called; from here on all
/// shared state is read-only and every bucket owns its sampler.
pub fn render(
    scene: &Scene,
    features: &Features,
    bvh: &Bvh,
    camera: &Camera,
    config: &RenderConfig,
) -> ImageBuffer {
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);
    log::info!(
        "rendering {}x{}: {} buckets, {} spp, {} triangles",
        config.width,
        config.height,
        buckets.len(),
        config.samples_per_pixel,
        bvh.primitive_count(),
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let sampler = Sampler::seeded(bucket_seed(config.seed, bucket.index));
            let mut state = RenderState::new(scene, features, bvh, sampler);
            let pixels = render_bucket(bucket, camera, &mut state, config.samples_per_pixel);
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        image.blit(&result.bucket, &result.pixels);
    }
    image
}

/// Derive a decorrelated per-bucket seed from the base seed.
fn bucket_seed(base: u64, bucket_index: usize) -> u64 {
    base ^ (bucket_index as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

/// Simple image buffer for storing render output.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket's pixels into place.
    pub fn blit(&mut self, bucket: &crate::bucket::Bucket, pixels: &[Color]) {
        for local_y in 0..bucket.height {
            for local_x in 0..bucket.width {
                let color = pixels[(local_y * bucket.width + local_x) as usize];
                self.set(bucket.x + local_x, bucket.y + local_y, color);
            }
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    /// Save as a PNG file.
    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> image::ImageResult<()> {
        image::save_buffer(
            path,
            &self.to_rgba(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )
    }
}
