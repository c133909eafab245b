//! Cornell box example.
//!
//! Renders the classic box with two rotated blocks and a ceiling light,
//! using BVH acceleration and light-sampled paths, and saves to PNG.

use std::sync::Arc;

use ember_renderer::{
    boxed, Angle, Camera, Color, DiffuseLight, Hittable, HittableList, Lambertian, PngSink, Quad,
    RotateY, SinkError, Translate, Vec3,
};

fn main() -> Result<(), SinkError> {
    env_logger::init();

    let (world, lights) = build_scene();

    let mut camera = Camera::new()
        .with_image(1.0, 600)
        .with_quality(64, 20)
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(Angle::from_degrees(40.0), Angle::ZERO, 10.0)
        .with_background(Color::ZERO);

    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    let mut sink = PngSink::new("cornell.png");
    camera.render(&world, &lights, &mut sink, threads)
}

fn build_scene() -> (HittableList, HittableList) {
    let red = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white = Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)));
    let green = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light = Arc::new(DiffuseLight::new(Color::new(15.0, 15.0, 15.0)));

    let mut world = HittableList::new();

    // Walls
    world.add(Arc::new(Quad::new(
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        green,
    )));
    world.add(Arc::new(Quad::new(
        Vec3::ZERO,
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        red,
    )));
    world.add(Arc::new(Quad::new(
        Vec3::ZERO,
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white.clone(),
    )));
    world.add(Arc::new(Quad::new(
        Vec3::new(555.0, 555.0, 555.0),
        Vec3::new(-555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -555.0),
        white.clone(),
    )));
    world.add(Arc::new(Quad::new(
        Vec3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        white.clone(),
    )));

    // Ceiling light, emitting downward
    let light_quad: Arc<dyn Hittable> = Arc::new(Quad::new(
        Vec3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
        light,
    ));
    world.add(light_quad.clone());

    // Tall and short blocks
    let tall = Arc::new(boxed(
        Vec3::ZERO,
        Vec3::new(165.0, 330.0, 165.0),
        white.clone(),
    ));
    let tall = Arc::new(RotateY::new(tall, Angle::from_degrees(15.0)));
    let tall = Arc::new(Translate::new(tall, Vec3::new(265.0, 0.0, 295.0)));
    world.add(tall);

    let short = Arc::new(boxed(
        Vec3::ZERO,
        Vec3::new(165.0, 165.0, 165.0),
        white,
    ));
    let short = Arc::new(RotateY::new(short, Angle::from_degrees(-18.0)));
    let short = Arc::new(Translate::new(short, Vec3::new(130.0, 0.0, 65.0)));
    world.add(short);

    world.optimize();

    let mut lights = HittableList::new();
    lights.add(light_quad);

    (world, lights)
}
