//! Primitive split policies for BVH construction.
//!
//! Both policies share one contract: given the bounding box of a
//! primitive range and an axis, reorder the range in place and return a
//! split index in `[0, len]`. Index 0 tells the builder that no split
//! improves on keeping the range as a leaf.

use std::cmp::Ordering;

use vermeer_math::Aabb;

use crate::primitive::Primitive;

/// Number of spatial bins evaluated by the SAH sweep.
const SAH_BINS: usize = 16;

/// Cost of one traversal step relative to one triangle test.
const TRAVERSAL_COST: f32 = 1.0;

/// Sort the range by centroid along `axis` and split at the median.
///
/// Deterministic baseline policy. A zero-extent axis degenerates into a
/// sort of equal keys and still yields the valid index `len / 2`.
pub fn split_by_median(_aabb: &Aabb, axis: usize, primitives: &mut [Primitive]) -> usize {
    primitives.sort_unstable_by(|a, b| {
        a.centroid()[axis]
            .partial_cmp(&b.centroid()[axis])
            .unwrap_or(Ordering::Equal)
    });
    primitives.len() / 2
}

/// Split the range with a binned surface-area-heuristic sweep along `axis`.
///
/// Primitives are binned by centroid over the box's extent on the axis;
/// each of the `SAH_BINS - 1` candidate planes is costed as
/// `left_count * left_area + right_count * right_area` and the cheapest
/// one wins. Returns 0 when the best plane does not beat the cost of
/// leaving the range as a leaf. Falls back to the median split when the
/// axis has no extent or every centroid lands in a single bin.
pub fn split_by_sah_bins(aabb: &Aabb, axis: usize, primitives: &mut [Primitive]) -> usize {
    let len = primitives.len();
    if len < 2 {
        return len / 2;
    }

    let axis_min = aabb.min[axis];
    let extent = aabb.max[axis] - axis_min;
    if extent <= f32::EPSILON {
        return split_by_median(aabb, axis, primitives);
    }

    // Bin primitives by centroid.
    let scale = SAH_BINS as f32 / extent;
    let mut bin_bounds = [Aabb::EMPTY; SAH_BINS];
    let mut bin_counts = [0usize; SAH_BINS];
    for prim in primitives.iter() {
        let bin = bin_index(prim.centroid()[axis], axis_min, scale);
        bin_counts[bin] += 1;
        bin_bounds[bin] = Aabb::union(&bin_bounds[bin], &prim.bounds());
    }
    if bin_counts.iter().any(|&count| count == len) {
        // Every centroid fell into one bin; the sweep has nothing to cut.
        return split_by_median(aabb, axis, primitives);
    }

    // Prefix/suffix sweeps accumulating bounds and counts per plane.
    let mut left_area = [0.0f32; SAH_BINS - 1];
    let mut left_count = [0usize; SAH_BINS - 1];
    let mut right_area = [0.0f32; SAH_BINS - 1];
    let mut right_count = [0usize; SAH_BINS - 1];

    let mut bounds = Aabb::EMPTY;
    let mut count = 0;
    for plane in 0..SAH_BINS - 1 {
        count += bin_counts[plane];
        bounds = Aabb::union(&bounds, &bin_bounds[plane]);
        left_count[plane] = count;
        left_area[plane] = bounds.surface_area();
    }

    bounds = Aabb::EMPTY;
    count = 0;
    for plane in (0..SAH_BINS - 1).rev() {
        count += bin_counts[plane + 1];
        bounds = Aabb::union(&bounds, &bin_bounds[plane + 1]);
        right_count[plane] = count;
        right_area[plane] = bounds.surface_area();
    }

    // Planes with an empty side are invalid; empty boxes report zero
    // area, so no division enters the cost at all.
    let mut best_plane = None;
    let mut best_cost = f32::INFINITY;
    for plane in 0..SAH_BINS - 1 {
        if left_count[plane] == 0 || right_count[plane] == 0 {
            continue;
        }
        let cost = left_count[plane] as f32 * left_area[plane]
            + right_count[plane] as f32 * right_area[plane];
        if cost < best_cost {
            best_cost = cost;
            best_plane = Some(plane);
        }
    }
    let Some(best_plane) = best_plane else {
        return split_by_median(aabb, axis, primitives);
    };

    let leaf_cost = len as f32 * aabb.surface_area();
    if TRAVERSAL_COST * aabb.surface_area() + best_cost >= leaf_cost {
        return 0;
    }

    let mid = partition_in_place(primitives, |prim| {
        bin_index(prim.centroid()[axis], axis_min, scale) <= best_plane
    });
    if mid == 0 || mid == len {
        // Float drift between binning passes; fall back rather than emit
        // an empty child.
        return split_by_median(aabb, axis, primitives);
    }
    mid
}

fn bin_index(value: f32, min: f32, scale: f32) -> usize {
    (((value - min) * scale) as usize).min(SAH_BINS - 1)
}

/// Hoare-style in-place partition; returns the number of primitives for
/// which the predicate holds, now at the front of the slice.
fn partition_in_place<F>(primitives: &mut [Primitive], pred: F) -> usize
where
    F: Fn(&Primitive) -> bool,
{
    let mut left = 0;
    let mut right = primitives.len();
    while left < right {
        if pred(&primitives[left]) {
            left += 1;
        } else {
            right -= 1;
            primitives.swap(left, right);
        }
    }
    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use vermeer_core::Vertex;

    fn triangle_at(center: Vec3) -> Primitive {
        let normal = Vec3::Z;
        Primitive::new(
            0,
            Vertex::new(center + Vec3::new(-0.1, -0.1, 0.0), normal, Vec2::ZERO),
            Vertex::new(center + Vec3::new(0.1, -0.1, 0.0), normal, Vec2::X),
            Vertex::new(center + Vec3::new(0.0, 0.1, 0.0), normal, Vec2::Y),
        )
    }

    fn range_bounds(primitives: &[Primitive]) -> Aabb {
        primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::union(&acc, &p.bounds()))
    }

    #[test]
    fn test_median_splits_in_half() {
        let mut primitives: Vec<Primitive> = (0..8)
            .map(|i| triangle_at(Vec3::new(i as f32, 0.0, 0.0)))
            .collect();
        let bounds = range_bounds(&primitives);

        let split = split_by_median(&bounds, 0, &mut primitives);
        assert_eq!(split, 4);

        // Everything left of the split sits left of everything after it.
        let max_left = primitives[..split]
            .iter()
            .map(|p| p.centroid().x)
            .fold(f32::MIN, f32::max);
        let min_right = primitives[split..]
            .iter()
            .map(|p| p.centroid().x)
            .fold(f32::MAX, f32::min);
        assert!(max_left <= min_right);
    }

    #[test]
    fn test_median_zero_extent_axis() {
        // All centroids share one y; splitting on y must still be valid.
        let mut primitives: Vec<Primitive> = (0..5)
            .map(|i| triangle_at(Vec3::new(i as f32, 2.0, 0.0)))
            .collect();
        let bounds = range_bounds(&primitives);

        let split = split_by_median(&bounds, 1, &mut primitives);
        assert_eq!(split, primitives.len() / 2);
    }

    #[test]
    fn test_sah_separates_clusters() {
        // Two clusters far apart on x; the cheapest plane is between them.
        let mut primitives: Vec<Primitive> = (0..4)
            .map(|i| triangle_at(Vec3::new(i as f32 * 0.3, 0.0, 0.0)))
            .chain((0..4).map(|i| triangle_at(Vec3::new(100.0 + i as f32 * 0.3, 0.0, 0.0))))
            .collect();
        let bounds = range_bounds(&primitives);

        let split = split_by_sah_bins(&bounds, 0, &mut primitives);
        assert_eq!(split, 4);
        assert!(primitives[..split].iter().all(|p| p.centroid().x < 50.0));
        assert!(primitives[split..].iter().all(|p| p.centroid().x > 50.0));
    }

    #[test]
    fn test_sah_index_always_in_range() {
        let mut primitives: Vec<Primitive> = (0..32)
            .map(|i| {
                triangle_at(Vec3::new(
                    (i % 7) as f32,
                    (i % 3) as f32,
                    (i % 5) as f32,
                ))
            })
            .collect();
        let bounds = range_bounds(&primitives);

        for axis in 0..3 {
            let split = split_by_sah_bins(&bounds, axis, &mut primitives);
            assert!(split <= primitives.len());
        }
    }

    #[test]
    fn test_sah_zero_extent_falls_back() {
        // Zero extent on z: must not divide by zero, must stay valid.
        let mut primitives: Vec<Primitive> = (0..6)
            .map(|i| triangle_at(Vec3::new(i as f32, 0.0, 0.0)))
            .collect();
        let mut bounds = range_bounds(&primitives);
        bounds.min.z = 1.0;
        bounds.max.z = 1.0;

        let split = split_by_sah_bins(&bounds, 2, &mut primitives);
        assert_eq!(split, primitives.len() / 2);
    }

    #[test]
    fn test_sah_is_not_a_stub() {
        // A clearly separable scene must produce a real split, not 0.
        let mut primitives: Vec<Primitive> = vec![
            triangle_at(Vec3::new(0.0, 0.0, 0.0)),
            triangle_at(Vec3::new(0.5, 0.0, 0.0)),
            triangle_at(Vec3::new(200.0, 0.0, 0.0)),
            triangle_at(Vec3::new(200.5, 0.0, 0.0)),
        ];
        let bounds = range_bounds(&primitives);
        let split = split_by_sah_bins(&bounds, 0, &mut primitives);
        assert!(split > 0 && split < primitives.len());
    }
}
