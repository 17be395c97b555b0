//! Local reflectance model: Lambert diffuse plus a Phong specular lobe.

use glam::Vec3;
use vermeer_core::Color;

use crate::primitive::HitInfo;
use crate::renderer::RenderState;

/// Reflect `v` about the normal `n`.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Diffuse albedo at the hit, honoring the texture mapping flags.
fn diffuse_albedo(state: &RenderState, hit: &HitInfo) -> Color {
    if state.features.texture_mapping {
        if let Some(texture) = &hit.material.kd_texture {
            return if state.features.bilinear_filtering {
                texture.sample_bilinear(hit.tex_coord)
            } else {
                texture.sample_nearest(hit.tex_coord)
            };
        }
    }
    hit.material.kd
}

/// Evaluate the local reflectance model at a shading point.
///
/// `view` and `light_dir` are unit vectors pointing away from the
/// surface; `light_color` is the incident radiance after visibility
/// attenuation. Lights below the surface contribute nothing.
pub fn compute_shading(
    state: &RenderState,
    view: Vec3,
    light_dir: Vec3,
    light_color: Color,
    hit: &HitInfo,
) -> Color {
    let n = hit.normal;
    let cos_theta = n.dot(light_dir);
    if cos_theta <= 0.0 {
        return Color::ZERO;
    }

    let diffuse = diffuse_albedo(state, hit) * light_color * cos_theta;

    let r = reflect(-light_dir, n);
    let spec_cos = r.dot(view).max(0.0);
    let specular = if spec_cos > 0.0 {
        hit.material.ks * light_color * spec_cos.powf(hit.material.shininess)
    } else {
        Color::ZERO
    };

    diffuse + specular
}
