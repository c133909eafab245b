//! Camera, radiance estimator, and the band-parallel render driver.

use std::sync::Mutex;
use std::thread;

use ember_math::sample::{gen_f32, worker_rng};
use ember_math::{Angle, Color, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::pdf::{HittablePdf, MixturePdf, Pdf};
use crate::progress::Progress;
use crate::sink::{to_rgb8, ImageSink, SinkError};

/// Camera configuration plus the derived state for ray generation.
///
/// Configure the public fields (directly or through the `with_*`
/// builders), then call `render`. Initialization is idempotent and
/// happens once before any worker starts.
pub struct Camera {
    /// Ratio of image width over height
    pub aspect_ratio: f32,
    /// Rendered image width in pixel count
    pub image_width: u32,
    /// Count of random samples for each pixel
    pub samples_per_pixel: u32,
    /// Maximum number of ray bounces into scene
    pub max_depth: u32,
    /// Scene background color
    pub background: Color,

    /// Vertical view angle (field of view)
    pub vfov: Angle,
    /// Point camera is looking from
    pub look_from: Vec3,
    /// Point camera is looking at
    pub look_at: Vec3,
    /// Camera-relative "up" direction
    pub vup: Vec3,

    /// Variation angle of rays through each pixel
    pub defocus_angle: Angle,
    /// Distance from camera look_from point to plane of perfect focus
    pub focus_dist: f32,

    // Cached computed values (set by initialize())
    image_height: u32,
    sqrt_spp: u32,
    recip_sqrt_spp: f32,
    pixel_samples_scale: f32,
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    initialized: bool,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            background: Color::ZERO,
            vfov: Angle::from_degrees(90.0),
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            defocus_angle: Angle::ZERO,
            focus_dist: 10.0,
            image_height: 0,
            sqrt_spp: 1,
            recip_sqrt_spp: 1.0,
            pixel_samples_scale: 1.0,
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
            initialized: false,
        }
    }

    /// Set image geometry.
    pub fn with_image(mut self, aspect_ratio: f32, image_width: u32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.image_width = image_width;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: Angle, defocus_angle: Angle, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Set background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Rendered image height, valid after `initialize`.
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Effective sample count after stratification rounding.
    pub fn effective_samples_per_pixel(&self) -> u32 {
        self.sqrt_spp * self.sqrt_spp
    }

    /// Derive the viewport, camera basis, and stratification parameters.
    ///
    /// Idempotent; misconfiguration is a programmer error and aborts.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        assert!(
            self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0,
            "camera aspect_ratio must be positive, got {}",
            self.aspect_ratio
        );
        assert!(self.image_width > 0, "camera image_width must be positive");
        assert!(
            self.samples_per_pixel > 0,
            "camera samples_per_pixel must be positive"
        );

        self.image_height = ((self.image_width as f32 / self.aspect_ratio) as u32).max(1);

        // Stratification: the pixel is split into sqrt_spp^2 cells with
        // one jittered sample each, so the effective sample count is the
        // square below samples_per_pixel.
        self.sqrt_spp = (self.samples_per_pixel as f32).sqrt() as u32;
        self.recip_sqrt_spp = 1.0 / self.sqrt_spp as f32;
        self.pixel_samples_scale = 1.0 / (self.sqrt_spp * self.sqrt_spp) as f32;

        self.center = self.look_from;

        // Determine viewport dimensions
        let theta = self.vfov.radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width =
            viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Calculate the u,v,w unit basis vectors for the camera coordinate frame
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Calculate the vectors across the horizontal and down the vertical viewport edges
        let viewport_u = viewport_width * self.u;
        let viewport_v = viewport_height * -self.v;

        // Calculate the horizontal and vertical delta vectors from pixel to pixel
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        // Calculate the location of the upper left pixel
        let viewport_upper_left =
            self.center - (self.focus_dist * self.w) - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        // Calculate the camera defocus disk basis vectors
        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;

        self.initialized = true;
    }

    /// Render the scene into the sink using `threads` workers.
    ///
    /// Each worker exclusively owns a contiguous band of rows; the scene,
    /// light set, and camera are shared read-only. `lights` may be an
    /// empty aggregate, in which case sampling falls back to the material
    /// PDFs alone.
    pub fn render(
        &mut self,
        world: &dyn Hittable,
        lights: &dyn Hittable,
        sink: &mut dyn ImageSink,
        threads: usize,
    ) -> Result<(), SinkError> {
        self.initialize();

        let width = self.image_width as usize;
        let height = self.image_height as usize;
        let threads = threads.max(1).min(height);

        log::info!(
            "rendering {}x{} image at {} samples per pixel on {} threads",
            width,
            height,
            self.effective_samples_per_pixel(),
            threads
        );

        let camera: &Camera = self;
        let progress = Mutex::new(Progress::new(height, threads));
        let mut pixels = vec![0u8; width * height * 3];

        thread::scope(|scope| {
            let mut rest = pixels.as_mut_slice();
            let mut row_start = 0;
            let progress = &progress;

            // Worker k owns rows [k*H/N, (k+1)*H/N).
            for k in 0..threads {
                let row_end = (k + 1) * height / threads;
                let band_rows = row_end - row_start;
                let (band, tail) = std::mem::take(&mut rest).split_at_mut(band_rows * width * 3);
                rest = tail;

                let first_row = row_start;
                scope.spawn(move || {
                    let mut rng = worker_rng(k as u64);
                    camera.render_band(world, lights, band, first_row, band_rows, k, progress, &mut rng);
                });

                row_start = row_end;
            }

            // Every row is owned by exactly one worker.
            debug_assert!(rest.is_empty());
            debug_assert_eq!(row_start, height);
        });

        sink.write(self.image_width, self.image_height, &pixels)
    }

    /// Render one worker's rows into its slice of the frame buffer.
    #[allow(clippy::too_many_arguments)]
    fn render_band(
        &self,
        world: &dyn Hittable,
        lights: &dyn Hittable,
        band: &mut [u8],
        first_row: usize,
        rows: usize,
        worker: usize,
        progress: &Mutex<Progress>,
        rng: &mut dyn RngCore,
    ) {
        let width = self.image_width as usize;

        for local_j in 0..rows {
            let j = (first_row + local_j) as u32;
            for i in 0..width {
                let mut pixel_color = Color::ZERO;

                for s_j in 0..self.sqrt_spp {
                    for s_i in 0..self.sqrt_spp {
                        let ray = self.get_ray(i as u32, j, s_i, s_j, rng);
                        pixel_color += self.ray_color(&ray, self.max_depth, world, lights, rng);
                    }
                }

                let rgb = to_rgb8(pixel_color * self.pixel_samples_scale);
                let offset = (local_j * width + i) * 3;
                band[offset..offset + 3].copy_from_slice(&rgb);
            }

            if let Ok(mut progress) = progress.lock() {
                progress.tick(worker, 1);
            }
        }
    }

    /// Generate a ray through pixel (i, j) for stratum (s_i, s_j).
    fn get_ray(&self, i: u32, j: u32, s_i: u32, s_j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = self.sample_square_stratified(s_i, s_j, rng);
        let pixel_sample = self.pixel00_loc
            + ((i as f32 + offset.x) * self.pixel_delta_u)
            + ((j as f32 + offset.y) * self.pixel_delta_v);

        let ray_origin = if self.defocus_angle.radians() <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };
        let ray_direction = pixel_sample - ray_origin;
        let ray_time = gen_f32(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    /// Jittered offset within the (s_i, s_j) sub-pixel cell, centered on
    /// the pixel.
    fn sample_square_stratified(&self, s_i: u32, s_j: u32, rng: &mut dyn RngCore) -> Vec3 {
        let px = ((s_i as f32 + gen_f32(rng)) * self.recip_sqrt_spp) - 0.5;
        let py = ((s_j as f32 + gen_f32(rng)) * self.recip_sqrt_spp) - 0.5;
        Vec3::new(px, py, 0.0)
    }

    /// Sample random point on the defocus disk for depth-of-field blur.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = ember_math::sample::random_in_unit_disk(rng);
        self.center + (p.x * self.defocus_disk_u) + (p.y * self.defocus_disk_v)
    }

    /// Recursive radiance estimate for one ray.
    ///
    /// Emission is always collected; diffuse continuations draw their
    /// direction from a 50/50 mixture of light sampling and the
    /// material's own PDF, and the estimate is weighted by the ratio of
    /// the material density to the mixture density.
    fn ray_color(
        &self,
        ray: &Ray,
        depth: u32,
        world: &dyn Hittable,
        lights: &dyn Hittable,
        rng: &mut dyn RngCore,
    ) -> Color {
        // Bounce limit reached: no more light is gathered.
        if depth == 0 {
            return Color::ZERO;
        }

        let mut rec = HitRecord::default();

        // The 0.001 near clip avoids shadow acne from self-intersection.
        if !world.hit(ray, Interval::new(0.001, f32::INFINITY), &mut rec, rng) {
            return self.background;
        }

        let emitted = rec.material.emitted(ray, &rec, rec.u, rec.v, rec.p);

        let Some(scatter) = rec.material.scatter(ray, &rec, rng) else {
            return emitted;
        };

        // Specular materials carry their continuation ray directly.
        if let Some(specular) = scatter.skip_ray {
            return emitted
                + scatter.attenuation * self.ray_color(&specular, depth - 1, world, lights, rng);
        }

        let Some(surface_pdf) = scatter.pdf else {
            return emitted;
        };

        let light_pdf = HittablePdf::new(lights, rec.p);
        let mixture = MixturePdf::new(&light_pdf, surface_pdf.as_ref());

        let direction = mixture.generate(rng);
        let pdf_value = mixture.value(direction, rng);

        let scattered = Ray::new(rec.p, direction, ray.time);
        let scattering_pdf = rec.material.scatter_pdf(ray, &rec, &scattered);

        let sample_color = self.ray_color(&scattered, depth - 1, world, lights, rng);

        emitted + (scatter.attenuation * scattering_pdf * sample_color) / pdf_value
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::HittableList;
    use crate::material::{DiffuseLight, Lambertian};
    use crate::quad::Quad;
    use crate::sink::MemorySink;
    use crate::sphere::Sphere;
    use std::sync::Arc;

    fn test_scene() -> HittableList {
        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::stationary(
            Vec3::new(0.0, -100.5, -1.0),
            100.0,
            Arc::new(Lambertian::new(Color::new(0.8, 0.8, 0.0))),
        )));
        world.add(Arc::new(Sphere::stationary(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::new(0.1, 0.2, 0.5))),
        )));
        world
    }

    fn test_camera(width: u32, spp: u32) -> Camera {
        Camera::new()
            .with_image(16.0 / 9.0, width)
            .with_quality(spp, 5)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(Angle::from_degrees(90.0), Angle::ZERO, 1.0)
            .with_background(Color::new(0.7, 0.8, 1.0))
    }

    #[test]
    fn test_initialize_derives_height() {
        let mut camera = Camera::new().with_image(2.0, 200);
        camera.initialize();
        assert_eq!(camera.image_height(), 100);
    }

    #[test]
    fn test_initialize_height_at_least_one() {
        let mut camera = Camera::new().with_image(100.0, 10);
        camera.initialize();
        assert_eq!(camera.image_height(), 1);
    }

    #[test]
    fn test_initialize_stratification() {
        let mut camera = Camera::new().with_quality(16, 5);
        camera.initialize();
        assert_eq!(camera.effective_samples_per_pixel(), 16);

        // Non-square counts round down to the nearest square.
        let mut camera = Camera::new().with_quality(10, 5);
        camera.initialize();
        assert_eq!(camera.effective_samples_per_pixel(), 9);
    }

    #[test]
    #[should_panic(expected = "aspect_ratio")]
    fn test_initialize_rejects_bad_aspect() {
        let mut camera = Camera::new().with_image(0.0, 100);
        camera.initialize();
    }

    #[test]
    #[should_panic(expected = "samples_per_pixel")]
    fn test_initialize_rejects_zero_spp() {
        let mut camera = Camera::new().with_quality(0, 5);
        camera.initialize();
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let mut camera = test_camera(100, 1);
        camera.initialize();

        let mut rng = worker_rng(0);
        let ray = camera.get_ray(50, camera.image_height() / 2, 0, 0, &mut rng);
        assert_eq!(ray.origin, Vec3::ZERO);
        assert!(ray.direction.z < 0.0);
        // Within half the viewport of straight ahead.
        let unit = ray.direction.normalize();
        assert!(unit.z < -0.5);
    }

    #[test]
    fn test_ray_time_in_unit_interval() {
        let mut camera = test_camera(100, 1);
        camera.initialize();

        let mut rng = worker_rng(0);
        for _ in 0..50 {
            let ray = camera.get_ray(10, 10, 0, 0, &mut rng);
            assert!((0.0..1.0).contains(&ray.time));
        }
    }

    #[test]
    fn test_render_writes_expected_frame_size() {
        let world = test_scene();
        let lights = HittableList::new();
        let mut camera = test_camera(32, 4);
        let mut sink = MemorySink::new();

        camera
            .render(&world, &lights, &mut sink, 2)
            .expect("render should succeed");

        assert_eq!(sink.width, 32);
        assert_eq!(sink.height, 18);
        assert_eq!(sink.pixels.len(), 32 * 18 * 3);

        // The sky background must show up somewhere non-black.
        assert!(sink.pixels.iter().any(|&b| b > 0));
    }

    #[test]
    fn test_render_deterministic_across_runs() {
        let world = test_scene();
        let lights = HittableList::new();

        let mut first = MemorySink::new();
        let mut second = MemorySink::new();

        let mut camera_a = test_camera(16, 4);
        camera_a.render(&world, &lights, &mut first, 2).unwrap();

        let mut camera_b = test_camera(16, 4);
        camera_b.render(&world, &lights, &mut second, 2).unwrap();

        assert_eq!(first.pixels, second.pixels);
    }

    #[test]
    fn test_render_bvh_matches_linear_scan() {
        let plain = test_scene();
        let mut optimized = test_scene();
        optimized.optimize();

        let lights = HittableList::new();

        let mut a = MemorySink::new();
        let mut b = MemorySink::new();

        let mut camera_a = test_camera(16, 1);
        camera_a.render(&plain, &lights, &mut a, 1).unwrap();

        let mut camera_b = test_camera(16, 1);
        camera_b.render(&optimized, &lights, &mut b, 1).unwrap();

        // The BVH changes traversal cost, not traversal results.
        assert_eq!(a.pixels, b.pixels);
    }

    #[test]
    fn test_render_emissive_quad_lights_scene() {
        // A black-background scene is lit only by the emitter.
        let mut world = test_scene();
        let light_quad: Arc<dyn Hittable> = Arc::new(Quad::new(
            Vec3::new(-1.0, 2.0, -2.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Arc::new(DiffuseLight::new(Color::new(8.0, 8.0, 8.0))),
        ));
        world.add(light_quad.clone());

        let mut lights = HittableList::new();
        lights.add(light_quad);

        let mut camera = test_camera(16, 4).with_background(Color::ZERO);
        let mut sink = MemorySink::new();
        camera.render(&world, &lights, &mut sink, 1).unwrap();

        assert!(
            sink.pixels.iter().any(|&b| b > 0),
            "emissive quad should light the scene"
        );
    }
}
