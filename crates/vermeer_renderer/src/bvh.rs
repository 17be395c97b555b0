//! Bounding volume hierarchy construction and traversal.
//!
//! The tree is a flat node array over a reordered primitive array; leaves
//! reference contiguous primitive ranges. Built once, then read-only for
//! the rest of the render.

use vermeer_core::Scene;
use vermeer_math::{Aabb, Ray};

use crate::primitive::{HitInfo, Primitive};
use crate::split::{split_by_median, split_by_sah_bins};

/// Which partitioning policy the builder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Median split on the longest centroid axis.
    Median,
    /// Binned surface-area-heuristic sweep.
    SahBinned,
}

/// Build-time tuning knobs.
#[derive(Debug, Clone)]
pub struct BvhConfig {
    /// Ranges at or below this size become leaves.
    pub leaf_size: usize,
    /// Hard recursion cutoff.
    pub max_depth: u32,
    pub split: SplitPolicy,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            leaf_size: 4,
            max_depth: 32,
            split: SplitPolicy::SahBinned,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf { first: u32, count: u32 },
    Interior { left: u32, right: u32 },
}

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bounds: Aabb,
    kind: NodeKind,
}

/// BVH over a scene's triangles. Immutable once built.
pub struct Bvh {
    nodes: Vec<BvhNode>,
    primitives: Vec<Primitive>,
}

impl Bvh {
    /// Gather the scene's triangles and build the tree. Must complete
    /// before any traversal starts.
    pub fn new(scene: &Scene, config: &BvhConfig) -> Self {
        let mut primitives = Vec::with_capacity(scene.triangle_count());
        for (mesh_id, mesh) in scene.meshes.iter().enumerate() {
            for tri in &mesh.triangles {
                primitives.push(Primitive::new(
                    mesh_id as u32,
                    mesh.vertices[tri[0] as usize],
                    mesh.vertices[tri[1] as usize],
                    mesh.vertices[tri[2] as usize],
                ));
            }
        }

        let count = primitives.len();
        let mut bvh = Self {
            nodes: Vec::new(),
            primitives,
        };
        if count > 0 {
            bvh.build_range(0, count, 0, config);
        }

        log::debug!(
            "built bvh: {} nodes over {} primitives",
            bvh.nodes.len(),
            bvh.primitives.len()
        );
        bvh
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    fn build_range(&mut self, first: usize, count: usize, depth: u32, config: &BvhConfig) -> u32 {
        let range = &self.primitives[first..first + count];
        let bounds = range
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::union(&acc, &p.bounds()));

        if count <= config.leaf_size || depth >= config.max_depth {
            return self.push_leaf(bounds, first, count);
        }

        // Split axis from the spread of centroids.
        let mut centroid_bounds = Aabb::EMPTY;
        for prim in range {
            centroid_bounds.grow(prim.centroid());
        }
        let axis = centroid_bounds.longest_axis();

        let range = &mut self.primitives[first..first + count];
        let split = match config.split {
            SplitPolicy::Median => split_by_median(&bounds, axis, range),
            SplitPolicy::SahBinned => split_by_sah_bins(&bounds, axis, range),
        };
        if split == 0 || split >= count {
            // The policy judged the whole range a leaf.
            return self.push_leaf(bounds, first, count);
        }

        let node_index = self.nodes.len() as u32;
        self.nodes.push(BvhNode {
            bounds,
            kind: NodeKind::Interior { left: 0, right: 0 },
        });
        let left = self.build_range(first, split, depth + 1, config);
        let right = self.build_range(first + split, count - split, depth + 1, config);
        self.nodes[node_index as usize].kind = NodeKind::Interior { left, right };
        node_index
    }

    fn push_leaf(&mut self, bounds: Aabb, first: usize, count: usize) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(BvhNode {
            bounds,
            kind: NodeKind::Leaf {
                first: first as u32,
                count: count as u32,
            },
        });
        index
    }

    /// Nearest-hit query.
    ///
    /// Narrows `ray.t` and fills `hit` when something closer than the
    /// ray's current `t` is found.
    pub fn intersect<'a>(&self, scene: &'a Scene, ray: &mut Ray, hit: &mut HitInfo<'a>) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        if self.nodes[0].bounds.entry_distance(ray).is_none() {
            return false;
        }
        self.intersect_node(0, scene, ray, hit)
    }

    fn intersect_node<'a>(
        &self,
        index: u32,
        scene: &'a Scene,
        ray: &mut Ray,
        hit: &mut HitInfo<'a>,
    ) -> bool {
        match self.nodes[index as usize].kind {
            NodeKind::Leaf { first, count } => {
                let mut any = false;
                for prim in &self.primitives[first as usize..(first + count) as usize] {
                    let material = &scene.meshes[prim.mesh_id as usize].material;
                    if prim.intersect(material, ray, hit) {
                        any = true;
                    }
                }
                any
            }
            NodeKind::Interior { left, right } => {
                let t_left = self.nodes[left as usize].bounds.entry_distance(ray);
                let t_right = self.nodes[right as usize].bounds.entry_distance(ray);

                // Visit the nearer child first so its hits can prune the
                // other subtree.
                let mut ordered: [Option<(u32, f32)>; 2] = [None, None];
                match (t_left, t_right) {
                    (None, None) => {}
                    (Some(a), None) => ordered[0] = Some((left, a)),
                    (None, Some(b)) => ordered[0] = Some((right, b)),
                    (Some(a), Some(b)) => {
                        ordered = if a <= b {
                            [Some((left, a)), Some((right, b))]
                        } else {
                            [Some((right, b)), Some((left, a))]
                        };
                    }
                }

                let mut any = false;
                for (child, entry) in ordered.into_iter().flatten() {
                    // The near child may have shrunk ray.t below this
                    // child's entry point.
                    if entry > ray.t {
                        continue;
                    }
                    if self.intersect_node(child, scene, ray, hit) {
                        any = true;
                    }
                }
                any
            }
        }
    }

    /// Any-hit query: true as soon as any primitive is hit strictly
    /// closer than `max_t`. Used for shadow-style occlusion tests.
    pub fn intersect_any(&self, scene: &Scene, ray: &Ray, max_t: f32) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.any_hit_node(0, scene, ray, max_t)
    }

    fn any_hit_node(&self, index: u32, scene: &Scene, ray: &Ray, max_t: f32) -> bool {
        let probe = Ray {
            t: max_t,
            ..*ray
        };
        if self.nodes[index as usize]
            .bounds
            .entry_distance(&probe)
            .is_none()
        {
            return false;
        }
        match self.nodes[index as usize].kind {
            NodeKind::Leaf { first, count } => {
                let mut scratch = HitInfo::default();
                for prim in &self.primitives[first as usize..(first + count) as usize] {
                    let material = &scene.meshes[prim.mesh_id as usize].material;
                    let mut probe = Ray {
                        t: max_t,
                        ..*ray
                    };
                    if prim.intersect(material, &mut probe, &mut scratch) {
                        return true;
                    }
                }
                false
            }
            NodeKind::Interior { left, right } => {
                self.any_hit_node(left, scene, ray, max_t)
                    || self.any_hit_node(right, scene, ray, max_t)
            }
        }
    }

    /// Reference nearest-hit query testing every primitive. Slow; exists
    /// to validate traversal and to debug scenes.
    pub fn intersect_brute_force<'a>(
        &self,
        scene: &'a Scene,
        ray: &mut Ray,
        hit: &mut HitInfo<'a>,
    ) -> bool {
        let mut any = false;
        for prim in &self.primitives {
            let material = &scene.meshes[prim.mesh_id as usize].material;
            if prim.intersect(material, ray, hit) {
                any = true;
            }
        }
        any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use vermeer_core::{Material, Mesh};

    fn random_triangle_scene(count: usize, seed: u64) -> Scene {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scene = Scene::new();
        for _ in 0..count {
            let center = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            let jitter = |rng: &mut StdRng| {
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            };
            scene.add_mesh(Mesh::single_triangle(
                center + jitter(&mut rng),
                center + jitter(&mut rng),
                center + jitter(&mut rng),
                Material::default(),
            ));
        }
        scene
    }

    fn check_bounds_invariant(bvh: &Bvh, index: u32) {
        let node = &bvh.nodes[index as usize];
        match node.kind {
            NodeKind::Leaf { first, count } => {
                for prim in &bvh.primitives[first as usize..(first + count) as usize] {
                    assert!(
                        node.bounds.contains(&prim.bounds()),
                        "leaf bounds must contain its primitives"
                    );
                }
            }
            NodeKind::Interior { left, right } => {
                for child in [left, right] {
                    assert!(
                        node.bounds.contains(&bvh.nodes[child as usize].bounds),
                        "node bounds must contain child bounds"
                    );
                    check_bounds_invariant(bvh, child);
                }
            }
        }
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::new();
        let bvh = Bvh::new(&scene, &BvhConfig::default());
        assert_eq!(bvh.node_count(), 0);

        let mut ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let mut hit = HitInfo::default();
        assert!(!bvh.intersect(&scene, &mut ray, &mut hit));
        assert!(!bvh.intersect_any(&scene, &ray, f32::MAX));
    }

    #[test]
    fn test_single_triangle_is_leaf() {
        let mut scene = Scene::new();
        scene.add_mesh(Mesh::single_triangle(
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
            Material::default(),
        ));
        let bvh = Bvh::new(&scene, &BvhConfig::default());
        assert_eq!(bvh.node_count(), 1);

        let mut ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(bvh.intersect(&scene, &mut ray, &mut hit));
        assert!((ray.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_bounds_invariant_both_policies() {
        let scene = random_triangle_scene(200, 7);
        for split in [SplitPolicy::Median, SplitPolicy::SahBinned] {
            let config = BvhConfig {
                split,
                ..BvhConfig::default()
            };
            let bvh = Bvh::new(&scene, &config);
            assert!(bvh.node_count() > 1, "200 triangles must not fit one leaf");
            check_bounds_invariant(&bvh, 0);
        }
    }

    #[test]
    fn test_traversal_matches_brute_force() {
        let scene = random_triangle_scene(150, 11);
        let mut rng = StdRng::seed_from_u64(13);

        for split in [SplitPolicy::Median, SplitPolicy::SahBinned] {
            let config = BvhConfig {
                split,
                ..BvhConfig::default()
            };
            let bvh = Bvh::new(&scene, &config);

            for _ in 0..200 {
                let origin = Vec3::new(
                    rng.gen_range(-15.0..15.0),
                    rng.gen_range(-15.0..15.0),
                    rng.gen_range(-15.0..15.0),
                );
                let direction = Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
                .normalize_or_zero();
                if direction == Vec3::ZERO {
                    continue;
                }

                let mut fast_ray = Ray::new(origin, direction);
                let mut fast_hit = HitInfo::default();
                let fast = bvh.intersect(&scene, &mut fast_ray, &mut fast_hit);

                let mut slow_ray = Ray::new(origin, direction);
                let mut slow_hit = HitInfo::default();
                let slow = bvh.intersect_brute_force(&scene, &mut slow_ray, &mut slow_hit);

                assert_eq!(fast, slow);
                if fast {
                    assert!(
                        (fast_ray.t - slow_ray.t).abs() < 1e-5,
                        "nearest hit distance must match brute force"
                    );
                }
            }
        }
    }

    #[test]
    fn test_any_hit_agrees_with_nearest() {
        let scene = random_triangle_scene(100, 23);
        let bvh = Bvh::new(&scene, &BvhConfig::default());
        let mut rng = StdRng::seed_from_u64(29);

        for _ in 0..100 {
            let origin = Vec3::new(
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
            );
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
            .normalize_or_zero();
            if direction == Vec3::ZERO {
                continue;
            }

            let mut ray = Ray::new(origin, direction);
            let mut hit = HitInfo::default();
            let nearest = bvh.intersect(&scene, &mut ray, &mut hit);

            let probe = Ray::new(origin, direction);
            assert_eq!(bvh.intersect_any(&scene, &probe, f32::MAX), nearest);
            if nearest {
                // Nothing lies strictly before the nearest hit.
                assert!(!bvh.intersect_any(&scene, &probe, ray.t * 0.999));
            }
        }
    }

    #[test]
    fn test_nearest_hit_prefers_closer_triangle() {
        let mut scene = Scene::new();
        for z in [-5.0f32, -2.0, -8.0] {
            scene.add_mesh(Mesh::single_triangle(
                Vec3::new(-2.0, -2.0, z),
                Vec3::new(2.0, -2.0, z),
                Vec3::new(0.0, 2.0, z),
                Material::default(),
            ));
        }
        let bvh = Bvh::new(&scene, &BvhConfig::default());

        let mut ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(bvh.intersect(&scene, &mut ray, &mut hit));
        assert!((ray.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_max_depth_is_respected() {
        let scene = random_triangle_scene(64, 31);
        let config = BvhConfig {
            leaf_size: 1,
            max_depth: 2,
            ..BvhConfig::default()
        };
        let bvh = Bvh::new(&scene, &config);
        // Depth 2 allows at most 3 levels: 1 + 2 + 4 nodes.
        assert!(bvh.node_count() <= 7);
        check_bounds_invariant(&bvh, 0);
    }
}
