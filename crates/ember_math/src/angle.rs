use std::ops::{Add, Div, Mul, Sub};

/// An angle carried in radians.
///
/// APIs that take angular parameters accept `Angle` so callers never mix
/// degrees and radians.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Angle {
    radians: f32,
}

impl Angle {
    pub const ZERO: Angle = Angle { radians: 0.0 };

    pub fn from_radians(radians: f32) -> Self {
        Self { radians }
    }

    pub fn from_degrees(degrees: f32) -> Self {
        Self {
            radians: degrees.to_radians(),
        }
    }

    pub fn radians(&self) -> f32 {
        self.radians
    }

    pub fn degrees(&self) -> f32 {
        self.radians.to_degrees()
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::from_radians(self.radians + rhs.radians)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle::from_radians(self.radians - rhs.radians)
    }
}

impl Mul<f32> for Angle {
    type Output = Angle;

    fn mul(self, s: f32) -> Angle {
        Angle::from_radians(self.radians * s)
    }
}

impl Div<f32> for Angle {
    type Output = Angle;

    fn div(self, s: f32) -> Angle {
        Angle::from_radians(self.radians / s)
    }
}
