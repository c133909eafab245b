use crate::Vec3;

/// Orthonormal basis built from a single direction.
///
/// Used to rotate directions sampled in a local z-up frame into world
/// space, e.g. cosine-weighted hemisphere samples about a surface normal.
#[derive(Debug, Copy, Clone)]
pub struct Onb {
    axis: [Vec3; 3],
}

impl Onb {
    /// Build a basis whose w axis is `n` normalized.
    ///
    /// Branchless construction from Duff et al., "Building an Orthonormal
    /// Basis, Revisited".
    pub fn new(n: Vec3) -> Self {
        let w = n.normalize();
        let sign = if w.z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + w.z);
        let b = w.x * w.y * a;

        let u = Vec3::new(1.0 + sign * w.x * w.x * a, sign * b, -sign * w.x);
        let v = Vec3::new(b, sign + w.y * w.y * a, -w.y);

        Self { axis: [u, v, w] }
    }

    pub fn u(&self) -> Vec3 {
        self.axis[0]
    }

    pub fn v(&self) -> Vec3 {
        self.axis[1]
    }

    pub fn w(&self) -> Vec3 {
        self.axis[2]
    }

    /// Transform a vector expressed in this basis into world space.
    pub fn transform(&self, local: Vec3) -> Vec3 {
        local.x * self.axis[0] + local.y * self.axis[1] + local.z * self.axis[2]
    }
}
