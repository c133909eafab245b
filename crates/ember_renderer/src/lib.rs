//! Ember Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer with importance-sampled next-event
//! estimation: primitives and transforms over a BVH-accelerated scene
//! graph, a material layer that exposes sampling PDFs, and a
//! band-parallel camera driver.

mod bvh;
mod camera;
mod hittable;
mod material;
mod medium;
mod pdf;
mod progress;
mod quad;
mod sink;
mod sphere;
mod transform;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, NormalDebug, ScatterResult,
};
pub use medium::ConstantMedium;
pub use pdf::{CosinePdf, HittablePdf, MixturePdf, Pdf, SpherePdf};
pub use progress::Progress;
pub use quad::{boxed, Quad};
pub use sink::{to_rgb8, ImageSink, MemorySink, PngSink, SinkError};
pub use sphere::Sphere;
pub use transform::{RotateY, Translate};

/// Re-export the math and texture foundations.
pub use ember_core::{
    CheckerTexture, ImageData, ImageTexture, NoiseTexture, SolidColor, Texture,
};
pub use ember_math::{Aabb, Angle, Color, Interval, Ray, Vec3};
