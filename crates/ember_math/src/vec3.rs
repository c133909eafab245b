use crate::Vec3;

/// Extension methods on `Vec3` used throughout the tracer.
pub trait Vec3Ext {
    /// True if every component has magnitude below 1e-8.
    ///
    /// Used to catch degenerate scatter directions before they become
    /// zero-length rays.
    fn near_zero(self) -> bool;

    /// Refract through a surface with the given relative index of refraction.
    ///
    /// `self` must be unit length. Callers are expected to have ruled out
    /// total internal reflection before calling.
    fn refracted(self, normal: Vec3, etai_over_etat: f32) -> Vec3;
}

impl Vec3Ext for Vec3 {
    fn near_zero(self) -> bool {
        let eps = 1e-8;
        self.x.abs() < eps && self.y.abs() < eps && self.z.abs() < eps
    }

    fn refracted(self, normal: Vec3, etai_over_etat: f32) -> Vec3 {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_out_perp = etai_over_etat * (self + cos_theta * normal);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * normal;
        r_out_perp + r_out_parallel
    }
}
