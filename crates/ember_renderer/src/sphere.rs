//! Sphere primitive, stationary or linearly moving.

use std::f32::consts::PI;
use std::sync::Arc;

use ember_math::sample::gen_f32;
use ember_math::{Aabb, Interval, Onb, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;

/// A sphere primitive.
///
/// The center is carried as a ray so a moving sphere is just one whose
/// center ray has a non-zero direction; `center.at(time)` interpolates
/// linearly over the shutter interval.
pub struct Sphere {
    center: Ray,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn stationary(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center: Ray::new_simple(center, Vec3::ZERO),
            radius,
            material,
            bbox,
        }
    }

    /// Create a sphere moving linearly from `center0` to `center1` over
    /// the shutter interval t in [0, 1].
    pub fn moving(center0: Vec3, center1: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let center = Ray::new_simple(center0, center1 - center0);

        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(center.at(0.0) - rvec, center.at(0.0) + rvec);
        let box1 = Aabb::from_points(center.at(1.0) - rvec, center.at(1.0) + rvec);
        let bbox = Aabb::surrounding(&box0, &box1);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // p is a point on the unit sphere centered at origin
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        let u = phi / (2.0 * PI);
        let v = theta / PI;
        (u, v)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let current_center = self.center.at(ray.time);
        let oc = current_center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - current_center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::get_sphere_uv(outward_normal);
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        // Only valid for stationary spheres used as sampling targets.
        let mut rec = HitRecord::default();
        let ray = Ray::new_simple(origin, direction);
        if !self.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, rng) {
            return 0.0;
        }

        let dist_squared = (self.center.at(0.0) - origin).length_squared();
        let cos_theta_max = (1.0 - self.radius * self.radius / dist_squared).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);

        1.0 / solid_angle
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center.at(0.0) - origin;
        let distance_squared = direction.length_squared();
        let uvw = Onb::new(direction);
        uvw.transform(random_to_sphere(self.radius, distance_squared, rng))
    }
}

/// Sample a direction, in a z-up local frame, toward a sphere of the
/// given radius seen from `distance_squared` away. Uniform over the
/// subtended cone.
fn random_to_sphere(radius: f32, distance_squared: f32, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);

    let cos_theta_max = (1.0 - radius * radius / distance_squared).sqrt();
    let z = 1.0 + r2 * (cos_theta_max - 1.0);

    let phi = 2.0 * PI * r1;
    let sin_theta = (1.0 - z * z).sqrt();
    let x = phi.cos() * sin_theta;
    let y = phi.sin() * sin_theta;

    Vec3::new(x, y, z)
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

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::stationary(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!(rec.front_face);

        // Hit point sits on the sphere surface.
        let center_dist = (rec.p - Vec3::new(0.0, 0.0, -1.0)).length();
        assert!((center_dist - 0.5).abs() < 1e-3 * 0.5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::stationary(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());
        let mut rng = StdRng::seed_from_u64(42);

        // Ray pointing away from sphere
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let mut rec = HitRecord::default();

        assert!(!sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_sphere_normal_faces_ray() {
        let sphere = Sphere::stationary(Vec3::ZERO, 1.0, gray());
        let mut rng = StdRng::seed_from_u64(42);

        // From outside: front face, normal toward the ray origin.
        let outside = Ray::new_simple(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(sphere.hit(&outside, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!(rec.front_face);
        assert!(outside.direction.dot(rec.normal) < 0.0);

        // From inside: back face, normal still against the ray.
        let inside = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(sphere.hit(&inside, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!(!rec.front_face);
        assert!(inside.direction.dot(rec.normal) < 0.0);
    }

    #[test]
    fn test_sphere_uv_poles_and_equator() {
        // theta = acos(-y), phi = atan2(-z, x) + pi
        let (_, v_bottom) = Sphere::get_sphere_uv(Vec3::new(0.0, -1.0, 0.0));
        assert!(v_bottom.abs() < 1e-6);

        let (_, v_top) = Sphere::get_sphere_uv(Vec3::new(0.0, 1.0, 0.0));
        assert!((v_top - 1.0).abs() < 1e-6);

        let (u, v) = Sphere::get_sphere_uv(Vec3::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-6);
        assert!((v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_moving_sphere_follows_time() {
        let sphere = Sphere::moving(
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::new(4.0, 0.0, -2.0),
            0.5,
            gray(),
        );
        let mut rng = StdRng::seed_from_u64(42);
        let t = Interval::new(0.001, f32::INFINITY);

        // At time 0 the sphere is at x=0.
        let early = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();
        assert!(sphere.hit(&early, t, &mut rec, &mut rng));

        // At time 1 it has moved to x=4 and the same ray misses.
        let late = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 1.0);
        let mut rec = HitRecord::default();
        assert!(!sphere.hit(&late, t, &mut rec, &mut rng));

        // A ray aimed at the endpoint hits only at time 1.
        let aimed = Ray::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 1.0);
        let mut rec = HitRecord::default();
        assert!(sphere.hit(&aimed, t, &mut rec, &mut rng));
    }

    #[test]
    fn test_moving_sphere_bbox_spans_both_endpoints() {
        let sphere = Sphere::moving(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            1.0,
            gray(),
        );
        let bbox = sphere.bounding_box();

        assert!(bbox.x.min <= -1.0);
        assert!(bbox.x.max >= 5.0);
        assert!(bbox.y.min <= -1.0 && bbox.y.max >= 1.0);
    }

    #[test]
    fn test_sphere_pdf_value_matches_cone() {
        let sphere = Sphere::stationary(Vec3::new(0.0, 0.0, -5.0), 1.0, gray());
        let mut rng = StdRng::seed_from_u64(42);

        // Direction straight at the center: inside the cone.
        let pdf = sphere.pdf_value(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), &mut rng);
        let cos_theta_max = (1.0f32 - 1.0 / 25.0).sqrt();
        let expected = 1.0 / (2.0 * PI * (1.0 - cos_theta_max));
        assert!((pdf - expected).abs() / expected < 1e-3);

        // Direction missing the sphere: zero density.
        let miss = sphere.pdf_value(Vec3::ZERO, Vec3::Y, &mut rng);
        assert_eq!(miss, 0.0);
    }

    #[test]
    fn test_sphere_random_directions_hit() {
        let sphere = Sphere::stationary(Vec3::new(0.0, 0.0, -5.0), 1.0, gray());
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let dir = sphere.random(Vec3::ZERO, &mut rng);
            let ray = Ray::new_simple(Vec3::ZERO, dir);
            let mut rec = HitRecord::default();
            assert!(
                sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng),
                "sampled direction {dir:?} missed the sphere"
            );
        }
    }
}
