//! Random sampling over object-safe RNG handles.
//!
//! Everything stochastic in the tracer draws from an explicit
//! `&mut dyn RngCore` so trait objects (`dyn Material`, `dyn Pdf`,
//! `dyn Hittable`) can consume randomness. Worker threads own independent
//! `ChaCha8Rng` instances derived from a fixed base seed, which keeps
//! renders reproducible per thread.

use std::f32::consts::PI;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::Vec3;

/// Base seed for render worker RNG streams.
const BASE_SEED: u64 = 0x5EED;

/// Create the RNG owned by one render worker.
///
/// Distinct `stream` values yield statistically independent sequences;
/// the same value always reproduces the same sequence.
pub fn worker_rng(stream: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(BASE_SEED.wrapping_add(stream))
}

/// Generate a random f32 in [0, 1) from an RngCore.
///
/// This is needed because `dyn RngCore` can't use `Rng::gen()` directly.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    // Same algorithm as rand's Standard distribution for f32
    let bits = rng.next_u32();
    (bits >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Generate a random f32 in [min, max).
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Generate a random integer in [min, max] inclusive.
#[inline]
pub fn gen_int(rng: &mut dyn RngCore, min: i32, max: i32) -> i32 {
    gen_range(rng, min as f32, (max + 1) as f32) as i32
}

/// Generate a random unit vector uniformly distributed on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Uniform azimuth plus uniform cos(polar) gives a uniform sphere
    // distribution without rejection.
    let phi = 2.0 * PI * gen_f32(rng);
    let cos_theta = gen_range(rng, -1.0, 1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Generate a random point in the unit disk (z = 0) using rejection sampling.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Generate a cosine-weighted direction in the local z-up hemisphere.
///
/// Uses Malley's method: sample uniformly on the disk, project up.
/// PDF = cos(theta) / PI.
pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);

    let phi = 2.0 * PI * r1;
    let sqrt_r2 = r2.sqrt();
    let x = phi.cos() * sqrt_r2;
    let y = phi.sin() * sqrt_r2;
    let z = (1.0 - r2).sqrt();

    Vec3::new(x, y, z)
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}
