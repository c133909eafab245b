//! Instance transforms: decorators that move rays into a child's local
//! frame on the way in and fix up hits on the way out.

use std::sync::Arc;

use ember_math::{Aabb, Angle, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};

/// Translate a wrapped primitive by a fixed offset.
pub struct Translate {
    child: Arc<dyn Hittable>,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new(child: Arc<dyn Hittable>, offset: Vec3) -> Self {
        let bbox = child.bounding_box().translate(offset);
        Self {
            child,
            offset,
            bbox,
        }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        // Move the ray into the child's frame instead of moving the child.
        let offset_ray = Ray::new(ray.origin - self.offset, ray.direction, ray.time);

        if !self.child.hit(&offset_ray, ray_t, rec, rng) {
            return false;
        }

        rec.p += self.offset;
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Rotate a wrapped primitive about the world Y axis.
pub struct RotateY {
    child: Arc<dyn Hittable>,
    sin_theta: f32,
    cos_theta: f32,
    bbox: Aabb,
}

impl RotateY {
    pub fn new(child: Arc<dyn Hittable>, angle: Angle) -> Self {
        let sin_theta = angle.radians().sin();
        let cos_theta = angle.radians().cos();

        // Bound all eight rotated corners of the child's box.
        let b = child.bounding_box();
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for corner in [
            Vec3::new(b.x.min, b.y.min, b.z.min),
            Vec3::new(b.x.max, b.y.min, b.z.min),
            Vec3::new(b.x.min, b.y.max, b.z.min),
            Vec3::new(b.x.max, b.y.max, b.z.min),
            Vec3::new(b.x.min, b.y.min, b.z.max),
            Vec3::new(b.x.max, b.y.min, b.z.max),
            Vec3::new(b.x.min, b.y.max, b.z.max),
            Vec3::new(b.x.max, b.y.max, b.z.max),
        ] {
            let rotated = Vec3::new(
                cos_theta * corner.x + sin_theta * corner.z,
                corner.y,
                -sin_theta * corner.x + cos_theta * corner.z,
            );
            min = min.min(rotated);
            max = max.max(rotated);
        }

        Self {
            child,
            sin_theta,
            cos_theta,
            bbox: Aabb::from_points(min, max),
        }
    }

    /// Rotate a point from world space into the child's frame (-theta).
    fn to_local(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * p.x - self.sin_theta * p.z,
            p.y,
            self.sin_theta * p.x + self.cos_theta * p.z,
        )
    }

    /// Rotate a point from the child's frame back to world space (+theta).
    fn to_world(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * p.x + self.sin_theta * p.z,
            p.y,
            -self.sin_theta * p.x + self.cos_theta * p.z,
        )
    }
}

impl Hittable for RotateY {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let rotated = Ray::new(
            self.to_local(ray.origin),
            self.to_local(ray.direction),
            ray.time,
        );

        if !self.child.hit(&rotated, ray_t, rec, rng) {
            return false;
        }

        rec.p = self.to_world(rec.p);
        rec.normal = self.to_world(rec.normal);
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
