//! Image-backed textures with nearest and bilinear sampling.
//!
//! Pixels are stored as linear RGB floats; files are converted from sRGB
//! on load.

use std::path::Path;

use glam::{Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
///
/// UV coordinates are in [0, 1] with (0, 0) at the bottom-left.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Linear RGB, row-major, top row first.
    pixels: Vec<Vec3>,
}

impl Texture {
    /// Create a texture from pixel data. The pixel count must match the
    /// dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a solid color texture (1x1).
    pub fn solid(color: Vec3) -> Self {
        Self::new(1, 1, vec![color])
    }

    /// Load a texture from an image file.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pixels = rgb
            .pixels()
            .map(|p| {
                Vec3::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();

        log::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            width,
            height
        );

        Ok(Self::new(width, height, pixels))
    }

    /// Sample with nearest-texel filtering.
    pub fn sample_nearest(&self, uv: Vec2) -> Vec3 {
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = (((1.0 - v) * self.height as f32) as u32).min(self.height - 1);

        self.texel(x, y)
    }

    /// Sample with bilinear filtering between the four closest texels.
    pub fn sample_bilinear(&self, uv: Vec2) -> Vec3 {
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);

        let x = u * (self.width as f32 - 1.0);
        let y = (1.0 - v) * (self.height as f32 - 1.0);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let top = self.texel(x0, y0).lerp(self.texel(x1, y0), fx);
        let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), fx);

        top.lerp(bottom, fy)
    }

    fn texel(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
