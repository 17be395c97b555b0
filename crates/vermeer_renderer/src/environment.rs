//! Environment map lookup over an unfolded-cube texture atlas.
//!
//! The atlas is a 4x3 cross: UP above FRONT, LEFT/FRONT/RIGHT/BACK
//! across the middle row, DOWN below FRONT. The cube face is picked by
//! the dominant direction component; some face coordinates are flipped
//! to undo the unfolding.

use glam::{Vec2, Vec3};
use vermeer_core::Color;
use vermeer_math::Ray;

use crate::renderer::RenderState;

/// Sample the scene's environment map along a ray's direction.
///
/// Returns black when the feature is disabled or the scene carries no
/// environment texture.
pub fn sample_environment_map(state: &RenderState, ray: &Ray) -> Color {
    if !state.features.environment_map {
        return Color::ZERO;
    }
    let Some(environment) = &state.scene.environment else {
        return Color::ZERO;
    };

    let direction = ray.direction;
    let max_component = direction
        .x
        .abs()
        .max(direction.y.abs())
        .max(direction.z.abs());
    if max_component <= 0.0 {
        return Color::ZERO;
    }

    // Dominant component becomes +-1, the others land in [-1, 1].
    let r = direction / max_component;
    let coords = (r + Vec3::ONE) / 2.0;

    let one = 1.0 - f32::EPSILON;
    let (u, v) = if r.x > one {
        // right
        (coords.z / 4.0 + 2.0 / 4.0, coords.y / 3.0 + 1.0 / 3.0)
    } else if r.x < -one {
        // left
        ((1.0 - coords.z) / 4.0, coords.y / 3.0 + 1.0 / 3.0)
    } else if r.y > one {
        // up
        (coords.x / 4.0 + 1.0 / 4.0, coords.z / 3.0 + 2.0 / 3.0)
    } else if r.y < -one {
        // down
        (coords.x / 4.0 + 1.0 / 4.0, (1.0 - coords.z) / 3.0)
    } else if r.z < -one {
        // front
        (coords.x / 4.0 + 1.0 / 4.0, coords.y / 3.0 + 1.0 / 3.0)
    } else {
        // back
        ((1.0 - coords.x) / 4.0 + 3.0 / 4.0, coords.y / 3.0 + 1.0 / 3.0)
    };

    let mut uv = Vec2::new(u, v);
    if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
        // Float drift at face seams; clamp rather than index outside the
        // atlas.
        log::warn!("environment uv out of range: ({}, {})", uv.x, uv.y);
        uv = uv.clamp(Vec2::ZERO, Vec2::ONE);
    }

    if state.features.bilinear_filtering {
        environment.sample_bilinear(uv)
    } else {
        environment.sample_nearest(uv)
    }
}
