//! Recursive ray dispatch.
//!
//! `render_ray` is the single entry point for primary and secondary
//! rays; its depth guard is what bounds every recursion in the renderer.

use glam::{Vec2, Vec3};
use vermeer_core::Color;
use vermeer_math::Ray;

use crate::environment::sample_environment_map;
use crate::light::compute_light_contribution;
use crate::primitive::HitInfo;
use crate::renderer::RenderState;
use crate::shading::reflect;

/// Offset applied to secondary ray origins to avoid self-intersection.
const RAY_OFFSET: f32 = 1e-4;

/// Trace one ray and return its radiance.
///
/// On a miss the environment map answers (black when disabled). On a hit
/// the local light contribution is augmented with a `ks`-weighted
/// specular component: a sampled glossy lobe when enabled, otherwise a
/// perfect mirror recursion.
pub fn render_ray(state: &mut RenderState, ray: &mut Ray, depth: u32) -> Color {
    if depth > state.features.max_ray_depth {
        return Color::ZERO;
    }

    let mut hit = HitInfo::default();
    if !state.bvh.intersect(state.scene, ray, &mut hit) {
        return sample_environment_map(state, ray);
    }

    let mut color = compute_light_contribution(state, ray, &hit);

    if state.features.glossy_reflection && hit.material.shininess > 0.0 {
        color += glossy_component(state, ray, &hit, depth);
    } else if state.features.reflections {
        color += mirror_component(state, ray, &hit, depth);
    }

    color
}

/// Single perfect-mirror bounce, weighted by the specular reflectance.
fn mirror_component(state: &mut RenderState, ray: &Ray, hit: &HitInfo, depth: u32) -> Color {
    let ks = hit.material.ks;
    if ks == Color::ZERO {
        return Color::ZERO;
    }

    let direction = reflect(ray.direction.normalize(), hit.normal);
    let origin = ray.hit_point() + RAY_OFFSET * direction;
    let mut reflected = Ray::new(origin, direction);

    ks * render_ray(state, &mut reflected, depth + 1)
}

/// Glossy reflection: average several rays perturbed around the perfect
/// mirror direction inside a disk whose radius shrinks with shininess.
/// Samples that would dive below the surface are discarded.
fn glossy_component(state: &mut RenderState, ray: &Ray, hit: &HitInfo, depth: u32) -> Color {
    let ks = hit.material.ks;
    let num_samples = state.features.glossy_samples;
    if ks == Color::ZERO || num_samples == 0 {
        return Color::ZERO;
    }

    let radius = 1.0 / hit.material.shininess;
    let reflection = reflect(ray.direction.normalize(), hit.normal);
    let (tangent, bitangent) = orthonormal_basis(reflection);
    let origin_point = ray.hit_point();

    let mut accumulated = Color::ZERO;
    for _ in 0..num_samples {
        let disk = sample_disk(state.sampler.next_2d(), radius);
        let direction = (reflection + disk.x * tangent + disk.y * bitangent).normalize();
        if direction.dot(hit.normal) <= 0.0 {
            continue;
        }

        let origin = origin_point + RAY_OFFSET * direction;
        let mut glossy_ray = Ray::new(origin, direction);
        accumulated += render_ray(state, &mut glossy_ray, depth + 1);
    }

    ks * accumulated / num_samples as f32
}

/// Build an orthonormal frame around the unit vector `w`.
fn orthonormal_basis(w: Vec3) -> (Vec3, Vec3) {
    let helper = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
    let tangent = w.cross(helper).normalize();
    let bitangent = w.cross(tangent);
    (tangent, bitangent)
}

/// Map a uniform square sample onto a disk of the given radius.
fn sample_disk(sample: Vec2, radius: f32) -> Vec2 {
    let r = radius * sample.x.sqrt();
    let phi = 2.0 * std::f32::consts::PI * sample.y;
    Vec2::new(r * phi.cos(), r * phi.sin())
}
