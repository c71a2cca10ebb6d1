//! Demo rendering yield surfaces in principal stress space.
//!
//! Draws a von Mises cylinder around the hydrostatic axis, a Drucker-Prager
//! cone sampled in octahedral (p, q, theta) coordinates, a few stress states
//! as a sphere set and the stress path between two of them as an arrow.
//!
//! Run with `RUST_LOG=debug` to follow the render pass. Options can be read
//! from a JSON file given as the first argument.

use std::f64::consts::PI;

use isoview::*;

/// Von Mises yield function with its gradient.
fn von_mises(sigma: DVec3) -> FieldSample {
    let mean = (sigma.x + sigma.y + sigma.z) / 3.0;
    let s = sigma - DVec3::splat(mean);
    let q = (1.5 * s.length_squared()).sqrt();
    let gradient = if q > 1e-12 { 1.5 * s / q } else { DVec3::ZERO };
    FieldSample::new(q, gradient)
}

/// Drucker-Prager yield function `q + alpha * p`, with `p` positive in compression.
fn drucker_prager(sigma: DVec3) -> FieldSample {
    const ALPHA: f64 = 0.6;
    let vm = von_mises(sigma);
    let p = -(sigma.x + sigma.y + sigma.z) / 3.0;
    FieldSample::new(vm.value + ALPHA * p, vm.gradient - DVec3::splat(ALPHA / 3.0))
}

fn main() -> Result<()> {
    init_logging();

    let options = match std::env::args().nth(1) {
        Some(path) => SceneOptions::from_json_file(path)?,
        None => SceneOptions {
            interact: false,
            save_on_exit: true,
            file_key: "isosurface_demo".to_string(),
            axes_len: 1.5,
            zoom: 1.2,
            ..SceneOptions::default()
        },
    };
    let mut scene = Scene::with_options(options);

    let mut cylinder = IsoSurface::new(von_mises)
        .with_bounds(DVec3::splat(-1.5), DVec3::splat(1.5))
        .with_divisions(UVec3::splat(31));
    cylinder.level_range = (0.8, 0.8);
    cylinder.color = Vec4::new(0.2, 0.4, 1.0, 0.6);
    cylinder.attach_to(&mut scene)?;

    // sampled over p in [0, 1], q in [0, 1.5], theta in [0, 2 pi]
    let mut cone = IsoSurface::new(drucker_prager)
        .with_bounds(DVec3::ZERO, DVec3::new(1.0, 1.5, 2.0 * PI))
        .with_divisions(UVec3::new(21, 21, 37));
    cone.oct_rotate = true;
    cone.num_levels = 3;
    cone.level_range = (0.4, 1.0);
    cone.colormap = ColormapSpec {
        name: "fire".to_string(),
        num_colors: 32,
        range_mode: ColormapRangeMode::LevelRange,
        ..ColormapSpec::default()
    };
    cone.attach_to(&mut scene)?;

    let states = SphereSet::from_spheres([
        (DVec3::new(-0.2, -0.2, -0.2), 0.05),
        (DVec3::new(0.5, -0.1, -0.4), 0.05),
        (DVec3::new(0.1, 0.6, -0.7), 0.05),
    ]);
    states.attach_to(&mut scene)?;

    let (start, end) = (states.center(0), states.center(2));
    if let (Some(start), Some(end)) = (start, end) {
        Arrow::from_origin(start, end - start)
            .with_color(Vec4::new(0.0, 0.6, 0.0, 1.0))
            .attach_to(&mut scene)?;
    }

    Sphere::at(DVec3::ZERO, 0.03).attach_to(&mut scene)?;

    scene.run()?;
    println!("wrote {}", scene.options().output_file_name());
    Ok(())
}
