//! Surface materials.

use std::sync::Arc;

use glam::Vec3;

use crate::Texture;

/// Color type alias (linear RGB values typically 0-1)
pub type Color = Vec3;

/// A Phong-style surface material.
#[derive(Clone, Debug)]
pub struct Material {
    /// Diffuse reflectance.
    pub kd: Color,
    /// Specular reflectance.
    pub ks: Color,
    /// Phong exponent; higher is shinier.
    pub shininess: f32,
    /// 0 = fully opaque, 1 = fully transparent.
    pub transparency: f32,
    /// Optional texture overriding `kd` when texture mapping is enabled.
    pub kd_texture: Option<Arc<Texture>>,
}

impl Material {
    /// A purely diffuse material.
    pub fn diffuse(kd: Color) -> Self {
        Self {
            kd,
            ..Self::default()
        }
    }

    /// A diffuse material with a specular lobe.
    pub fn glossy(kd: Color, ks: Color, shininess: f32) -> Self {
        Self {
            kd,
            ks,
            shininess,
            ..Self::default()
        }
    }

    /// A diffuse material that lets a fraction of light through.
    pub fn transparent(kd: Color, transparency: f32) -> Self {
        Self {
            kd,
            transparency: transparency.clamp(0.0, 1.0),
            ..Self::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kd: Vec3::splat(0.5),
            ks: Vec3::ZERO,
            shininess: 1.0,
            transparency: 0.0,
            kd_texture: None,
        }
    }
}
