//! Demo render: a small walled scene with a point light and an area
//! light, written out as PNG.
//!
//! Usage: `render_scene [features.json] [output.png]`

use anyhow::Context;
use vermeer_renderer::{
    render, Bvh, BvhConfig, Camera, Features, Light, Material, Mesh, ParallelogramLight,
    PointLight, RenderConfig, Scene, Vec3,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let features = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading feature config {path}"))?;
            serde_json::from_str(&text).context("parsing feature config")?
        }
        None => Features::default(),
    };
    let output = args.next().unwrap_or_else(|| "render.png".to_string());

    let scene = build_scene();

    let start = std::time::Instant::now();
    let bvh = Bvh::new(&scene, &BvhConfig::default());
    log::info!(
        "bvh built in {:?} ({} nodes)",
        start.elapsed(),
        bvh.node_count()
    );

    let config = RenderConfig {
        width: 800,
        height: 450,
        samples_per_pixel: 32,
        ..RenderConfig::default()
    };
    let mut camera = Camera::new()
        .with_resolution(config.width, config.height)
        .with_position(Vec3::new(0.0, 2.5, 6.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
        .with_vfov(50.0);
    camera.initialize();

    let start = std::time::Instant::now();
    let image = render(&scene, &features, &bvh, &camera, &config);
    log::info!("rendered in {:?}", start.elapsed());

    image
        .save_png(&output)
        .with_context(|| format!("writing {output}"))?;
    log::info!("saved {output}");

    Ok(())
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();

    // Floor and back wall.
    scene.add_mesh(Mesh::quad(
        Vec3::new(-4.0, 0.0, -4.0),
        Vec3::new(8.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 8.0),
        Material::diffuse(Vec3::new(0.73, 0.73, 0.73)),
    ));
    scene.add_mesh(Mesh::quad(
        Vec3::new(-4.0, 0.0, -4.0),
        Vec3::new(0.0, 4.0, 0.0),
        Vec3::new(8.0, 0.0, 0.0),
        Material::diffuse(Vec3::new(0.48, 0.56, 0.70)),
    ));

    // A shiny slab and a matte pyramid to catch reflections.
    scene.add_mesh(Mesh::quad(
        Vec3::new(-2.4, 0.01, -1.2),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0),
        Material::glossy(Vec3::new(0.2, 0.2, 0.2), Vec3::new(0.6, 0.6, 0.6), 80.0),
    ));
    let apex = Vec3::new(1.4, 1.6, 0.0);
    let base = [
        Vec3::new(0.6, 0.0, -0.8),
        Vec3::new(2.2, 0.0, -0.8),
        Vec3::new(1.4, 0.0, 0.8),
    ];
    let red = Material::diffuse(Vec3::new(0.8, 0.25, 0.2));
    scene.add_mesh(Mesh::single_triangle(base[0], base[1], apex, red.clone()));
    scene.add_mesh(Mesh::single_triangle(base[1], base[2], apex, red.clone()));
    scene.add_mesh(Mesh::single_triangle(base[2], base[0], apex, red));

    // Key light plus a soft overhead panel.
    scene.add_light(Light::Point(PointLight {
        position: Vec3::new(-3.0, 3.5, 3.0),
        color: Vec3::new(0.9, 0.85, 0.8),
    }));
    scene.add_light(Light::Parallelogram(ParallelogramLight {
        v0: Vec3::new(-1.0, 3.8, -1.0),
        edge01: Vec3::new(2.0, 0.0, 0.0),
        edge02: Vec3::new(0.0, 0.0, 2.0),
        color0: Vec3::splat(0.4),
        color1: Vec3::splat(0.4),
        color2: Vec3::splat(0.3),
        color3: Vec3::splat(0.3),
    }));

    scene
}
