//! Light-sample visibility under binary and transparency-aware shadowing.

use glam::Vec3;
use vermeer_core::Color;
use vermeer_math::Ray;

use crate::primitive::HitInfo;
use crate::renderer::RenderState;

/// Tolerance for matching a shadow ray's hit distance against the
/// geometric light-to-point distance.
const BINARY_TOLERANCE: f32 = 5e-4;

/// Arrival tolerance of the transparency march.
const MARCH_TOLERANCE: f32 = 1e-5;

/// Offset used to step the march origin past an occluder.
const MARCH_ADVANCE: f32 = 1e-6;

/// Upper bound on occluders processed in one march. Progress along the
/// ray is monotonic; this guards against pathological geometry.
const MAX_MARCH_STEPS: u32 = 64;

/// Binary visibility: the sample reaches the shading point only if the
/// shadow ray's nearest hit lies at the shading point itself.
///
/// The ray is cast from the light toward the point, so an opaque
/// occluder strictly between the two shortens the recorded hit distance
/// and fails the match.
pub fn visibility_binary(state: &RenderState, light_position: Vec3, ray: &Ray) -> bool {
    let point = ray.hit_point();

    let mut shadow_ray = Ray::towards(light_position, point);
    let mut shadow_hit = HitInfo::default();
    let intersects = state.bvh.intersect(state.scene, &mut shadow_ray, &mut shadow_hit);

    let distance = (point - light_position).length();
    intersects && (shadow_ray.t - distance).abs() <= BINARY_TOLERANCE
}

/// Transparency-aware visibility: march from the light sample toward the
/// shading point, attenuating the carried color by `kd * (1 -
/// transparency)` at each occluder and stepping the origin just past it.
///
/// Returns the carried color as it stood *before the last attenuation
/// step*. The march's final intersection is normally the shading surface
/// itself, so an unoccluded sample comes back unmodified and each real
/// occluder contributes exactly one factor. This one-step-stale result
/// is intentional, long-standing behavior; keep it.
pub fn visibility_transparency(
    state: &RenderState,
    light_position: Vec3,
    light_color: Color,
    ray: &Ray,
) -> Color {
    let point = ray.hit_point();

    let mut carried = light_color;
    let mut previous = light_color;
    let mut origin = light_position;

    for _ in 0..MAX_MARCH_STEPS {
        let mut march_ray = Ray::towards(origin, point);
        let mut march_hit = HitInfo::default();
        let intersects = state.bvh.intersect(state.scene, &mut march_ray, &mut march_hit);
        let arrived = (march_ray.t - (point - origin).length()).abs() <= MARCH_TOLERANCE;

        if intersects {
            previous = carried;
            let material = march_hit.material;
            carried *= material.kd * (1.0 - material.transparency);
            origin = march_ray.origin + (march_ray.t + MARCH_ADVANCE) * march_ray.direction;
        }

        if !intersects || arrived {
            break;
        }
    }

    previous
}

/// Resolve a light sample's visibility according to the feature flags.
pub fn visible_light(
    state: &RenderState,
    light_position: Vec3,
    light_color: Color,
    ray: &Ray,
) -> Color {
    if !state.features.shadows {
        light_color
    } else if !state.features.transparency {
        if visibility_binary(state, light_position, ray) {
            light_color
        } else {
            Color::ZERO
        }
    } else {
        visibility_transparency(state, light_position, light_color, ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::{Bvh, BvhConfig};
    use crate::sampler::Sampler;
    use vermeer_core::{Features, Material, Mesh, Scene};

    /// Large triangle in the y = 0 plane around the origin.
    fn ground_mesh(material: Material) -> Mesh {
        Mesh::single_triangle(
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, 10.0),
            material,
        )
    }

    /// Small horizontal triangle straddling the y axis at the given height.
    fn occluder_mesh(height: f32, material: Material) -> Mesh {
        Mesh::single_triangle(
            Vec3::new(-1.0, height, -1.0),
            Vec3::new(1.0, height, -1.0),
            Vec3::new(0.0, height, 1.0),
            material,
        )
    }

    /// A camera ray that hits the ground at the origin. Approaches from
    /// below so occluders stacked above the ground never block it.
    fn ground_ray(scene: &Scene, bvh: &Bvh) -> Ray {
        let mut ray = Ray::new(Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let mut hit = HitInfo::default();
        assert!(bvh.intersect(scene, &mut ray, &mut hit));
        assert!((ray.t - 3.0).abs() < 1e-4);
        ray
    }

    fn state_of<'a>(scene: &'a Scene, features: &'a Features, bvh: &'a Bvh) -> RenderState<'a> {
        RenderState::new(scene, features, bvh, Sampler::seeded(0))
    }

    const LIGHT_POSITION: Vec3 = Vec3::new(0.0, 5.0, 0.0);

    #[test]
    fn test_shadows_disabled_passes_through() {
        let mut scene = Scene::new();
        scene.add_mesh(ground_mesh(Material::default()));
        scene.add_mesh(occluder_mesh(2.5, Material::default()));
        let bvh = Bvh::new(&scene, &BvhConfig::default());
        let features = Features {
            shadows: false,
            ..Features::default()
        };
        let ray = ground_ray(&scene, &bvh);
        let state = state_of(&scene, &features, &bvh);

        let color = Vec3::new(0.9, 0.8, 0.7);
        assert_eq!(visible_light(&state, LIGHT_POSITION, color, &ray), color);
    }

    #[test]
    fn test_binary_unoccluded_is_visible() {
        let mut scene = Scene::new();
        scene.add_mesh(ground_mesh(Material::default()));
        let bvh = Bvh::new(&scene, &BvhConfig::default());
        let features = Features::default();
        let ray = ground_ray(&scene, &bvh);
        let state = state_of(&scene, &features, &bvh);

        assert!(visibility_binary(&state, LIGHT_POSITION, &ray));
        assert_eq!(
            visible_light(&state, LIGHT_POSITION, Vec3::ONE, &ray),
            Vec3::ONE
        );
    }

    #[test]
    fn test_binary_occluded_is_dark() {
        let mut scene = Scene::new();
        scene.add_mesh(ground_mesh(Material::default()));
        scene.add_mesh(occluder_mesh(2.5, Material::default()));
        let bvh = Bvh::new(&scene, &BvhConfig::default());
        let features = Features::default();
        let ray = ground_ray(&scene, &bvh);
        let state = state_of(&scene, &features, &bvh);

        assert!(!visibility_binary(&state, LIGHT_POSITION, &ray));
        assert_eq!(
            visible_light(&state, LIGHT_POSITION, Vec3::ONE, &ray),
            Vec3::ZERO
        );
    }

    #[test]
    fn test_transparency_unoccluded_returns_full_color() {
        let mut scene = Scene::new();
        scene.add_mesh(ground_mesh(Material::diffuse(Vec3::splat(0.2))));
        let bvh = Bvh::new(&scene, &BvhConfig::default());
        let features = Features {
            transparency: true,
            ..Features::default()
        };
        let ray = ground_ray(&scene, &bvh);
        let state = state_of(&scene, &features, &bvh);

        // The ground's own attenuation is the final step and is not
        // part of the returned value.
        let color = Vec3::new(1.0, 0.5, 0.25);
        assert_eq!(
            visibility_transparency(&state, LIGHT_POSITION, color, &ray),
            color
        );
    }

    #[test]
    fn test_transparency_single_occluder_attenuates_once() {
        let mut scene = Scene::new();
        scene.add_mesh(ground_mesh(Material::diffuse(Vec3::splat(0.2))));
        scene.add_mesh(occluder_mesh(
            2.5,
            Material {
                kd: Vec3::splat(0.5),
                transparency: 0.5,
                ..Material::default()
            },
        ));
        let bvh = Bvh::new(&scene, &BvhConfig::default());
        let features = Features {
            transparency: true,
            ..Features::default()
        };
        let ray = ground_ray(&scene, &bvh);
        let state = state_of(&scene, &features, &bvh);

        // kd * (1 - transparency) = 0.25, applied exactly once.
        let result = visibility_transparency(&state, LIGHT_POSITION, Vec3::ONE, &ray);
        assert!((result - Vec3::splat(0.25)).length() < 1e-6);
    }

    #[test]
    fn test_transparency_two_stacked_occluders() {
        let mut scene = Scene::new();
        scene.add_mesh(ground_mesh(Material::diffuse(Vec3::splat(0.2))));
        scene.add_mesh(occluder_mesh(
            2.5,
            Material {
                kd: Vec3::splat(0.5),
                transparency: 0.5,
                ..Material::default()
            },
        ));
        scene.add_mesh(occluder_mesh(
            1.5,
            Material {
                kd: Vec3::splat(0.8),
                transparency: 0.75,
                ..Material::default()
            },
        ));
        let bvh = Bvh::new(&scene, &BvhConfig::default());
        let features = Features {
            transparency: true,
            ..Features::default()
        };
        let ray = ground_ray(&scene, &bvh);
        let state = state_of(&scene, &features, &bvh);

        // Both occluders contribute (0.5*0.5) * (0.8*0.25) = 0.05; the
        // ground's final factor stays out of the returned value.
        let result = visibility_transparency(&state, LIGHT_POSITION, Vec3::ONE, &ray);
        assert!((result - Vec3::splat(0.05)).length() < 1e-6);
    }
}
