// Re-export glam for convenience
pub use glam::*;

// Ember math types
mod aabb;
mod angle;
mod interval;
mod onb;
mod ray;
mod vec3;

pub mod sample;

pub use aabb::Aabb;
pub use angle::Angle;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use vec3::Vec3Ext;

/// Linear RGB color carried in a `Vec3` (unbounded, non-negative).
pub type Color = Vec3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        let c = a + b;
        assert_eq!(c, Vec3::new(5.0, 7.0, 9.0));
    }

    #[test]
    fn test_color_is_vec3() {
        let c: Color = Color::new(0.1, 0.2, 0.3);
        assert_eq!(c * 2.0, Vec3::new(0.2, 0.4, 0.6));
    }
}
