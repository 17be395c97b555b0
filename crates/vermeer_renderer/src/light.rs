//! Light sampling and per-light radiance contributions.

use glam::{Vec2, Vec3};
use vermeer_core::{Color, Light, ParallelogramLight, PointLight, SegmentLight};
use vermeer_math::Ray;

use crate::primitive::HitInfo;
use crate::renderer::RenderState;
use crate::shading::compute_shading;
use crate::visibility::visible_light;

/// A point sample on a light source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub position: Vec3,
    pub color: Color,
}

/// Map a 1d sample in [0, 1) onto a segment light.
///
/// Position and color are the same affine combination of the endpoints.
pub fn sample_segment_light(light: &SegmentLight, sample: f32) -> LightSample {
    LightSample {
        position: light.endpoint0 + sample * (light.endpoint1 - light.endpoint0),
        color: light.color0 + sample * (light.color1 - light.color0),
    }
}

/// Map a 2d sample in [0, 1)^2 onto a parallelogram light.
///
/// The color blend treats the light as a unit square in sample space and
/// weights the four corner colors bilinearly; for sheared parallelograms
/// this is an approximation, kept as the contract.
pub fn sample_parallelogram_light(light: &ParallelogramLight, sample: Vec2) -> LightSample {
    let position = light.v0 + sample.x * light.edge01 + sample.y * light.edge02;

    let a0 = (1.0 - sample.x) * (1.0 - sample.y);
    let a1 = (1.0 - sample.x) * sample.y;
    let a2 = sample.x * (1.0 - sample.y);
    let a3 = sample.x * sample.y;

    LightSample {
        position,
        color: a0 * light.color0 + a1 * light.color1 + a2 * light.color2 + a3 * light.color3,
    }
}

fn contribution_point_light(
    state: &mut RenderState,
    light: &PointLight,
    ray: &Ray,
    hit: &HitInfo,
) -> Color {
    let visible = visible_light(state, light.position, light.color, ray);

    let point = ray.hit_point();
    let light_dir = (light.position - point).normalize();
    let view = -ray.direction.normalize();

    compute_shading(state, view, light_dir, visible, hit)
}

fn contribution_segment_light(
    state: &mut RenderState,
    light: &SegmentLight,
    ray: &Ray,
    hit: &HitInfo,
    num_samples: u32,
) -> Color {
    let mut contribution = Color::ZERO;
    if num_samples == 0 {
        return contribution;
    }

    let point = ray.hit_point();
    let view = -ray.direction.normalize();

    for _ in 0..num_samples {
        let sample = sample_segment_light(light, state.sampler.next_1d());
        let visible = visible_light(state, sample.position, sample.color, ray);
        let light_dir = (sample.position - point).normalize();
        contribution += compute_shading(state, view, light_dir, visible, hit) / num_samples as f32;
    }

    contribution
}

fn contribution_parallelogram_light(
    state: &mut RenderState,
    light: &ParallelogramLight,
    ray: &Ray,
    hit: &HitInfo,
    num_samples: u32,
) -> Color {
    let mut contribution = Color::ZERO;
    if num_samples == 0 {
        return contribution;
    }

    let point = ray.hit_point();
    let view = -ray.direction.normalize();

    for _ in 0..num_samples {
        let sample = sample_parallelogram_light(light, state.sampler.next_2d());
        let visible = visible_light(state, sample.position, sample.color, ray);
        let light_dir = (sample.position - point).normalize();
        contribution += compute_shading(state, view, light_dir, visible, hit) / num_samples as f32;
    }

    contribution
}

/// Accumulate the outgoing radiance contributed by every scene light.
///
/// Point lights take a single visibility + shading evaluation; area
/// lights average `shadow_samples` stochastic samples.
pub fn compute_light_contribution(state: &mut RenderState, ray: &Ray, hit: &HitInfo) -> Color {
    let scene = state.scene;
    let num_samples = state.features.shadow_samples;

    let mut outgoing = Color::ZERO;
    for light in &scene.lights {
        outgoing += match light {
            Light::Point(point) => contribution_point_light(state, point, ray, hit),
            Light::Segment(segment) => {
                contribution_segment_light(state, segment, ray, hit, num_samples)
            }
            Light::Parallelogram(quad) => {
                contribution_parallelogram_light(state, quad, ray, hit, num_samples)
            }
        };
    }
    outgoing
}
