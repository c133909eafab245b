//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Built by recursive median split on the longest axis of the node's
//! bounding box. Traversal results are identical to a linear scan over
//! the same primitives; only the cost changes.

use std::cmp::Ordering;
use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};

/// Binary BVH node over shared primitive handles.
///
/// A one-primitive leaf stores the same handle as both children, which
/// keeps traversal free of special cases at the cost of a duplicate box
/// test.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

impl BvhNode {
    /// Build a BVH over a list of primitives.
    ///
    /// The vector is sorted in place along the split axes while the tree
    /// is constructed. Panics on an empty list; callers guard that case.
    pub fn new(mut objects: Vec<Arc<dyn Hittable>>) -> Self {
        assert!(!objects.is_empty(), "cannot build a BVH over an empty list");
        Self::build(&mut objects)
    }

    fn build(objects: &mut [Arc<dyn Hittable>]) -> Self {
        // Union box of the whole slice picks the split axis.
        let mut bbox = Aabb::EMPTY;
        for object in objects.iter() {
            bbox = Aabb::surrounding(&bbox, &object.bounding_box());
        }
        let axis = bbox.longest_axis();

        let (left, right): (Arc<dyn Hittable>, Arc<dyn Hittable>) = match objects {
            [only] => (only.clone(), only.clone()),
            [first, second] => (first.clone(), second.clone()),
            _ => {
                objects.sort_by(|a, b| compare_box_min(a, b, axis));

                let mid = objects.len() / 2;
                let (lower, upper) = objects.split_at_mut(mid);
                (
                    Arc::new(Self::build(lower)) as Arc<dyn Hittable>,
                    Arc::new(Self::build(upper)) as Arc<dyn Hittable>,
                )
            }
        };

        Self { left, right, bbox }
    }
}

/// Order primitives by the minimum of their bounding box on one axis.
fn compare_box_min(a: &Arc<dyn Hittable>, b: &Arc<dyn Hittable>, axis: usize) -> Ordering {
    let a_min = a.bounding_box().axis_interval(axis).min;
    let b_min = b.bounding_box().axis_interval(axis).min;
    a_min.partial_cmp(&b_min).unwrap_or(Ordering::Equal)
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        if !self.bbox.hit(ray, ray_t) {
            return false;
        }

        let hit_left = self.left.hit(ray, ray_t, rec, rng);

        // Only search the right child up to the closest hit so far.
        let right_max = if hit_left { rec.t } else { ray_t.max };
        let hit_right = self
            .right
            .hit(ray, Interval::new(ray_t.min, right_max), rec, rng);

        hit_left || hit_right
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::HittableList;
    use crate::material::Lambertian;
    use crate::sphere::Sphere;
    use ember_math::sample::gen_range;
    use ember_math::{Color, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray_sphere(center: Vec3, radius: f32) -> Arc<dyn Hittable> {
        Arc::new(Sphere::stationary(
            center,
            radius,
            Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
        ))
    }

    fn random_spheres(count: usize, seed: u64) -> Vec<Arc<dyn Hittable>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let center = Vec3::new(
                    gen_range(&mut rng, -10.0, 10.0),
                    gen_range(&mut rng, -10.0, 10.0),
                    gen_range(&mut rng, -10.0, 10.0),
                );
                gray_sphere(center, gen_range(&mut rng, 0.1, 1.0))
            })
            .collect()
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BvhNode::new(vec![gray_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5)]);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_root_box_is_union_of_leaves() {
        let objects = random_spheres(37, 7);
        let expected = objects.iter().fold(Aabb::EMPTY, |acc, o| {
            Aabb::surrounding(&acc, &o.bounding_box())
        });

        let bvh = BvhNode::new(objects);
        assert_eq!(bvh.bounding_box(), expected);
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let objects = random_spheres(64, 3);

        let mut list = HittableList::new();
        for object in &objects {
            list.add(object.clone());
        }
        let bvh = BvhNode::new(objects);

        let mut rng = StdRng::seed_from_u64(42);
        let mut ray_rng = StdRng::seed_from_u64(99);
        let t = Interval::new(0.001, f32::INFINITY);

        for _ in 0..500 {
            let origin = Vec3::new(
                gen_range(&mut ray_rng, -15.0, 15.0),
                gen_range(&mut ray_rng, -15.0, 15.0),
                15.0,
            );
            let target = Vec3::new(
                gen_range(&mut ray_rng, -10.0, 10.0),
                gen_range(&mut ray_rng, -10.0, 10.0),
                gen_range(&mut ray_rng, -10.0, 10.0),
            );
            let ray = Ray::new_simple(origin, target - origin);

            let mut rec_list = HitRecord::default();
            let mut rec_bvh = HitRecord::default();
            let hit_list = list.hit(&ray, t, &mut rec_list, &mut rng);
            let hit_bvh = bvh.hit(&ray, t, &mut rec_bvh, &mut rng);

            assert_eq!(hit_list, hit_bvh, "disagreement for ray {ray:?}");
            if hit_list {
                assert!(
                    (rec_list.t - rec_bvh.t).abs() < 1e-4,
                    "t mismatch: {} vs {}",
                    rec_list.t,
                    rec_bvh.t
                );
            }
        }
    }

    #[test]
    fn test_bvh_two_spheres_ordered() {
        let bvh = BvhNode::new(vec![
            gray_sphere(Vec3::new(0.0, 0.0, -4.0), 0.5),
            gray_sphere(Vec3::new(0.0, 0.0, -2.0), 0.5),
        ]);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        // The nearer sphere wins regardless of child order.
        assert!((rec.t - 1.5).abs() < 1e-4);
    }
}
