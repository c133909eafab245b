//! Material trait for surface scattering.

use std::f32::consts::PI;
use std::sync::Arc;

use ember_core::{SolidColor, Texture};
use ember_math::sample::{gen_f32, random_unit_vector};
use ember_math::{Color, Ray, Vec3, Vec3Ext};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::pdf::{CosinePdf, Pdf, SpherePdf};

/// Result of scattering a ray off a material.
///
/// Diffuse-like materials carry a sampling PDF for the integrator to mix
/// with light sampling; specular materials bypass the PDF machinery and
/// hand back the continuation ray directly in `skip_ray`.
pub struct ScatterResult {
    /// Color attenuation (how much light is absorbed)
    pub attenuation: Color,
    /// Sampling density over continuation directions
    pub pdf: Option<Box<dyn Pdf>>,
    /// Precomputed specular continuation ray, bypassing the PDF path
    pub skip_ray: Option<Ray>,
}

impl ScatterResult {
    /// Scatter with a sampling PDF (Lambertian-like materials).
    pub fn diffuse(attenuation: Color, pdf: Box<dyn Pdf>) -> Self {
        Self {
            attenuation,
            pdf: Some(pdf),
            skip_ray: None,
        }
    }

    /// Scatter along a single deterministic ray (specular materials).
    pub fn specular(attenuation: Color, ray: Ray) -> Self {
        Self {
            attenuation,
            pdf: None,
            skip_ray: Some(ray),
        }
    }
}

/// Trait for materials that describe how light interacts with surfaces.
///
/// Uses `&mut dyn RngCore` for object safety (required for `dyn Material`).
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns Some(ScatterResult) if the ray scatters, or None if absorbed.
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        None
    }

    /// Density of the material's own sampling strategy for the given
    /// scattered direction. Used to weight mixture-sampled directions.
    fn scatter_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        0.0
    }

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material.
pub struct Lambertian {
    texture: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with a constant albedo color.
    pub fn new(albedo: Color) -> Self {
        Self {
            texture: Arc::new(SolidColor::new(albedo)),
        }
    }

    /// Create a new Lambertian material backed by a texture.
    pub fn textured(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        Some(ScatterResult::diffuse(
            self.texture.value(rec.u, rec.v, rec.p),
            Box::new(CosinePdf::new(rec.normal)),
        ))
    }

    fn scatter_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let cos_theta = rec.normal.dot(scattered.direction.normalize());
        (cos_theta / PI).max(0.0)
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction, rec.normal).normalize()
            + self.fuzz * random_unit_vector(rng);

        // Only scatter if the fuzzed ray leaves the surface
        if reflected.dot(rec.normal) > 0.0 {
            let ray = Ray::new(rec.p, reflected, ray_in.time);
            Some(ScatterResult::specular(self.albedo, ray))
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction
    refraction_index: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `refraction_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    pub fn new(refraction_index: f32) -> Self {
        Self { refraction_index }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
        let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.refraction_index
        } else {
            self.refraction_index
        };

        let unit_direction = ray_in.direction.normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                unit_direction.refracted(rec.normal, refraction_ratio)
            };

        let ray = Ray::new(rec.p, direction, ray_in.time);
        Some(ScatterResult::specular(Color::ONE, ray))
    }
}

/// Direction-independent scatterer used by constant-density media.
pub struct Isotropic {
    texture: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Color) -> Self {
        Self {
            texture: Arc::new(SolidColor::new(albedo)),
        }
    }

    pub fn textured(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        Some(ScatterResult::diffuse(
            self.texture.value(rec.u, rec.v, rec.p),
            Box::new(SpherePdf),
        ))
    }

    fn scatter_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        1.0 / (4.0 * PI)
    }
}

/// Diffuse light emitter.
pub struct DiffuseLight {
    texture: Arc<dyn Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light with a constant emission color.
    pub fn new(emit: Color) -> Self {
        Self {
            texture: Arc::new(SolidColor::new(emit)),
        }
    }

    pub fn textured(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }
}

impl Material for DiffuseLight {
    fn emitted(&self, _ray_in: &Ray, rec: &HitRecord, u: f32, v: f32, p: Vec3) -> Color {
        // One-sided emitter: dark when seen from behind.
        if !rec.front_face {
            return Color::ZERO;
        }
        self.texture.value(u, v, p)
    }
}

/// Visualization material mapping the surface normal to a color.
///
/// Not intended for reference renders; the scatter_pdf override cancels
/// the cosine sampling density so the normal color passes through.
pub struct NormalDebug;

impl Material for NormalDebug {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        Some(ScatterResult::diffuse(
            0.5 * (rec.normal + Color::ONE),
            Box::new(CosinePdf::new(rec.normal)),
        ))
    }

    fn scatter_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let cos_theta = rec.normal.dot(scattered.direction.normalize());
        (cos_theta / PI).max(0.0)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
