//! Axis-independent parallelogram primitive and the six-quad box helper.

use std::sync::Arc;

use ember_math::sample::gen_f32;
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::material::Material;

/// A parallelogram defined by a corner `q` and two edge vectors `u`, `v`.
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    // Plane data cached at construction: n = u x v, normal = n / |n|,
    // d = normal . q, w = n / (n . n) for planar coordinates.
    w: Vec3,
    normal: Vec3,
    d: f32,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        let n = u.cross(v);
        let normal = n.normalize();
        let d = normal.dot(q);
        let w = n / n.dot(n);
        let area = n.length();

        // Bound both diagonals of the parallelogram.
        let bbox_diagonal1 = Aabb::from_points(q, q + u + v);
        let bbox_diagonal2 = Aabb::from_points(q + u, q + v);
        let bbox = Aabb::surrounding(&bbox_diagonal1, &bbox_diagonal2);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            area,
            material,
            bbox,
        }
    }
}

impl Hittable for Quad {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let denom = self.normal.dot(ray.direction);

        // Ray parallel to the plane
        if denom.abs() < 1e-8 {
            return false;
        }

        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if !ray_t.contains(t) {
            return false;
        }

        // Planar coordinates of the hit point within the parallelogram
        let intersection = ray.at(t);
        let planar_hit = intersection - self.q;
        let alpha = self.w.dot(planar_hit.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hit));

        if !Interval::UNIT.contains(alpha) || !Interval::UNIT.contains(beta) {
            return false;
        }

        rec.u = alpha;
        rec.v = beta;
        rec.t = t;
        rec.p = intersection;
        rec.material = self.material.as_ref();
        rec.set_face_normal(ray, self.normal);

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        let mut rec = HitRecord::default();
        let ray = Ray::new_simple(origin, direction);
        if !self.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, rng) {
            return 0.0;
        }

        // Convert the surface-area density 1/area to solid-angle measure.
        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();

        distance_squared / (cosine * self.area)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.q + gen_f32(rng) * self.u + gen_f32(rng) * self.v;
        p - origin
    }
}

/// Build the six-quad aggregate enclosing the axis-aligned volume between
/// two opposite corners.
pub fn boxed(a: Vec3, b: Vec3, material: Arc<dyn Material>) -> HittableList {
    let mut sides = HittableList::new();

    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    // front
    sides.add(Arc::new(Quad::new(
        Vec3::new(min.x, min.y, max.z),
        dx,
        dy,
        material.clone(),
    )));
    // right
    sides.add(Arc::new(Quad::new(
        Vec3::new(max.x, min.y, max.z),
        -dz,
        dy,
        material.clone(),
    )));
    // back
    sides.add(Arc::new(Quad::new(
        Vec3::new(max.x, min.y, min.z),
        -dx,
        dy,
        material.clone(),
    )));
    // left
    sides.add(Arc::new(Quad::new(
        Vec3::new(min.x, min.y, min.z),
        dz,
        dy,
        material.clone(),
    )));
    // top
    sides.add(Arc::new(Quad::new(
        Vec3::new(min.x, max.y, max.z),
        dx,
        -dz,
        material.clone(),
    )));
    // bottom
    sides.add(Arc::new(Quad::new(
        Vec3::new(min.x, min.y, min.z),
        dx,
        dz,
        material,
    )));

    sides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use ember_math::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)))
    }

    fn unit_quad() -> Quad {
        // Unit square in the z=0 plane, corner at origin.
        Quad::new(Vec3::ZERO, Vec3::X, Vec3::Y, gray())
    }

    #[test]
    fn test_quad_hit_inside() {
        let quad = unit_quad();
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new_simple(Vec3::new(0.5, 0.5, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();

        assert!(quad.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!((rec.u - 0.5).abs() < 1e-5);
        assert!((rec.v - 0.5).abs() < 1e-5);
        assert!(ray.direction.dot(rec.normal) < 0.0);
    }

    #[test]
    fn test_quad_miss_outside_edges() {
        let quad = unit_quad();
        let mut rng = StdRng::seed_from_u64(42);
        let t = Interval::new(0.001, f32::INFINITY);

        for origin in [
            Vec3::new(1.5, 0.5, 1.0),
            Vec3::new(-0.5, 0.5, 1.0),
            Vec3::new(0.5, 1.5, 1.0),
            Vec3::new(0.5, -0.5, 1.0),
        ] {
            let ray = Ray::new_simple(origin, Vec3::new(0.0, 0.0, -1.0));
            let mut rec = HitRecord::default();
            assert!(!quad.hit(&ray, t, &mut rec, &mut rng), "hit from {origin:?}");
        }
    }

    #[test]
    fn test_quad_miss_parallel_ray() {
        let quad = unit_quad();
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new_simple(Vec3::new(0.5, 0.5, 1.0), Vec3::X);
        let mut rec = HitRecord::default();
        assert!(!quad.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_quad_uv_corners() {
        let quad = unit_quad();
        let mut rng = StdRng::seed_from_u64(42);
        let t = Interval::new(0.001, f32::INFINITY);

        let ray = Ray::new_simple(Vec3::new(0.25, 0.75, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(quad.hit(&ray, t, &mut rec, &mut rng));
        assert!((rec.u - 0.25).abs() < 1e-5);
        assert!((rec.v - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_quad_bbox_padded() {
        // A planar quad still produces a box with usable depth.
        let quad = unit_quad();
        let bbox = quad.bounding_box();
        assert!(bbox.z.size() >= 1e-4);
        assert!(bbox.x.size() >= 1.0);
        assert!(bbox.y.size() >= 1.0);
    }

    #[test]
    fn test_quad_pdf_value_perpendicular() {
        // Unit quad seen head-on from distance 2 along its normal:
        // pdf = dist^2 / (cos * area) = 4 / (1 * 1) = 4.
        let quad = unit_quad();
        let mut rng = StdRng::seed_from_u64(42);

        let origin = Vec3::new(0.5, 0.5, 2.0);
        let pdf = quad.pdf_value(origin, Vec3::new(0.0, 0.0, -1.0), &mut rng);
        assert!((pdf - 4.0).abs() < 1e-3, "pdf = {pdf}");
    }

    #[test]
    fn test_quad_random_points_on_surface() {
        let quad = unit_quad();
        let mut rng = StdRng::seed_from_u64(42);
        let origin = Vec3::new(0.5, 0.5, 3.0);

        for _ in 0..200 {
            let dir = quad.random(origin, &mut rng);
            let target = origin + dir;
            // Samples land on the quad's plane inside its bounds.
            assert!(target.z.abs() < 1e-5);
            assert!((0.0..=1.0).contains(&target.x));
            assert!((0.0..=1.0).contains(&target.y));
        }
    }

    #[test]
    fn test_boxed_six_sides() {
        let b = boxed(Vec3::ZERO, Vec3::ONE, gray());
        assert_eq!(b.len(), 6);

        let bbox = b.bounding_box();
        assert!(bbox.x.min <= 0.0 && bbox.x.max >= 1.0);
        assert!(bbox.y.min <= 0.0 && bbox.y.max >= 1.0);
        assert!(bbox.z.min <= 0.0 && bbox.z.max >= 1.0);
    }

    #[test]
    fn test_boxed_hit_from_every_axis() {
        let b = boxed(-Vec3::ONE, Vec3::ONE, gray());
        let mut rng = StdRng::seed_from_u64(42);
        let t = Interval::new(0.001, f32::INFINITY);

        let probes = [
            (Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0)),
            (Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0)),
            (Vec3::new(3.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
            (Vec3::new(-3.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            (Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
            (Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        ];
        for (origin, dir) in probes {
            let ray = Ray::new_simple(origin, dir);
            let mut rec = HitRecord::default();
            assert!(b.hit(&ray, t, &mut rec, &mut rng), "miss from {origin:?}");
            assert!((rec.t - 2.0).abs() < 1e-4, "t = {} from {origin:?}", rec.t);
            // Entry face, not the far side.
            assert!(ray.direction.dot(rec.normal) < 0.0);
        }
    }
}
