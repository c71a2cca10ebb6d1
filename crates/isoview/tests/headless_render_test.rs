//! Headless rendering integration tests.
//!
//! These run full passes through the software renderer, which samples every
//! isosurface field through the callback registry and writes PNG files.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use isoview::*;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("isoview_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn small_options(file_key: &str) -> SceneOptions {
    SceneOptions {
        interact: false,
        save_on_exit: true,
        file_key: file_key.to_string(),
        width: 96,
        height: 80,
        ..SceneOptions::default()
    }
}

#[test]
fn test_sphere_scene_writes_png() {
    let dir = output_dir("sphere");
    let mut scene = Scene::with_options(small_options("out"));
    Sphere::at(DVec3::splat(0.5), 0.3).attach_to(&mut scene).unwrap();

    let mut renderer = HeadlessRenderer::new().with_output_dir(&dir);
    scene.run_with(&mut renderer).unwrap();

    let bytes = std::fs::read(dir.join("out.png")).unwrap();
    assert_eq!(bytes[..8], PNG_SIGNATURE);
    let frame = renderer.last_frame().unwrap();
    assert_eq!((frame.width, frame.height), (96, 80));
    assert!(frame.has_content());
    assert_eq!(renderer.num_windows(), 0);
    assert_eq!(renderer.num_drawables(), 0);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_no_file_without_save_on_exit() {
    let dir = output_dir("nosave");
    let mut scene = Scene::with_options(SceneOptions {
        save_on_exit: false,
        ..small_options("skipped")
    });
    Arrow::new().attach_to(&mut scene).unwrap();

    let mut renderer = HeadlessRenderer::new().with_output_dir(&dir);
    scene.run_with(&mut renderer).unwrap();
    assert!(!dir.join("skipped.png").exists());
    assert!(renderer.last_frame().is_some());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_every_grid_node_is_sampled_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let iso = IsoSurface::new(move |x: DVec3| {
        counter.fetch_add(1, Ordering::SeqCst);
        FieldSample::new(x.length_squared(), 2.0 * x)
    })
    .with_divisions(UVec3::new(4, 5, 6));

    let mut scene = Scene::with_options(SceneOptions {
        save_on_exit: false,
        ..small_options("count")
    });
    iso.attach_to(&mut scene).unwrap();
    scene.run_with(&mut HeadlessRenderer::new()).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 4 * 5 * 6);
}

#[test]
fn test_isosurface_scene_draws_surface() {
    let dir = output_dir("iso");
    let mut scene = Scene::with_options(SceneOptions {
        with_planes: false,
        ..small_options("iso")
    });
    let mut iso = IsoSurface::new(|x: DVec3| FieldSample::new(x.length_squared(), 2.0 * x))
        .with_divisions(UVec3::splat(11));
    iso.level_range = (0.5, 0.5);
    iso.attach_to(&mut scene).unwrap();

    let mut renderer = HeadlessRenderer::new().with_output_dir(&dir);
    scene.run_with(&mut renderer).unwrap();
    assert!(dir.join("iso.png").is_file());
    assert!(renderer.last_frame().unwrap().has_content());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_octahedral_rotation_maps_grid_points() {
    let seen: Arc<Mutex<Vec<DVec3>>> = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let mut iso = IsoSurface::new(move |x: DVec3| {
        log.lock().unwrap().push(x);
        FieldSample::scalar(x.x - x.y)
    })
    .with_bounds(DVec3::new(0.0, 0.0, 0.0), DVec3::new(1.0, 1.0, std::f64::consts::PI))
    .with_divisions(UVec3::new(3, 3, 5));
    iso.oct_rotate = true;

    let mut scene = Scene::with_options(SceneOptions {
        save_on_exit: false,
        ..small_options("oct")
    });
    iso.attach_to(&mut scene).unwrap();
    scene.run_with(&mut HeadlessRenderer::new()).unwrap();

    let points = seen.lock().unwrap();
    assert_eq!(points.len(), 45);
    // the hydrostatic component is -p, which spans [-1, 0]
    for x in points.iter() {
        let mean = (x.x + x.y + x.z) / 3.0;
        assert!((-1.0 - 1e-9..=1e-9).contains(&mean), "{x}");
    }
    // the first node is p = q = 0
    assert!(points[0].length() < 1e-12);
    assert!(points.iter().any(|x| (x.x - x.y).abs() > 0.1));
}

#[test]
fn test_panicking_field_is_reported_after_teardown() {
    let mut scene = Scene::with_options(SceneOptions {
        save_on_exit: false,
        ..small_options("broken")
    });
    Sphere::new().attach_to(&mut scene).unwrap();
    IsoSurface::new(|x: DVec3| -> FieldSample {
        assert!(x.z < 0.0, "only defined below the x-y plane");
        FieldSample::scalar(x.z)
    })
    .with_divisions(UVec3::splat(3))
    .attach_to(&mut scene)
    .unwrap();

    let mut renderer = HeadlessRenderer::new();
    let err = scene.run_with(&mut renderer).unwrap_err();
    assert!(matches!(err, IsoviewError::Evaluation { .. }), "{err:?}");
    assert!(err.is_execution());
    assert_eq!(renderer.num_windows(), 0);
    assert!(!scene.spheres()[0].is_registered());
}

#[test]
fn test_interactive_flag_renders_once() {
    let dir = output_dir("interact");
    let mut scene = Scene::with_options(SceneOptions {
        interact: true,
        ..small_options("interactive")
    });
    SphereSet::new().attach_to(&mut scene).unwrap();

    let mut renderer = HeadlessRenderer::new().with_output_dir(&dir);
    scene.run_with(&mut renderer).unwrap();
    assert!(dir.join("interactive.png").is_file());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_unwritable_output_is_an_execution_error() {
    let dir = output_dir("unwritable").join("missing").join("nested");
    let mut scene = Scene::with_options(small_options("never"));
    Sphere::new().attach_to(&mut scene).unwrap();

    let mut renderer = HeadlessRenderer::new().with_output_dir(&dir);
    let err = scene.run_with(&mut renderer).unwrap_err();
    assert!(matches!(err, IsoviewError::Execution(1)), "{err:?}");
    assert_eq!(renderer.num_windows(), 0);
}

#[test]
fn test_zero_sized_window_is_a_setup_error() {
    let mut scene = Scene::with_options(SceneOptions {
        width: 0,
        ..small_options("empty")
    });
    Sphere::new().attach_to(&mut scene).unwrap();

    let err = scene.run_with(&mut HeadlessRenderer::new()).unwrap_err();
    assert!(matches!(err, IsoviewError::Setup(_)));
}

#[test]
fn test_options_from_json_drive_the_pass() {
    let dir = output_dir("json");
    let options = SceneOptions::from_json_str(
        r#"{ "interact": false, "save_on_exit": true, "file_key": "from_json",
             "width": 40, "height": 40, "full_axes": false, "reverse": true }"#,
    )
    .unwrap();
    assert!(options.hydro_line);

    let mut scene = Scene::with_options(options);
    Arrow::from_origin(DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0))
        .attach_to(&mut scene)
        .unwrap();
    let mut renderer = HeadlessRenderer::new().with_output_dir(&dir);
    scene.run_with(&mut renderer).unwrap();

    let png = std::fs::read(dir.join("from_json.png")).unwrap();
    assert_eq!(png[..8], PNG_SIGNATURE);
    assert_eq!(renderer.last_frame().unwrap().to_png().unwrap()[..8], PNG_SIGNATURE);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_oversized_output_is_a_setup_error() {
    let mut scene = Scene::with_options(SceneOptions {
        width: 2000,
        height: 2000,
        png_magnification: 100_000,
        ..small_options("huge")
    });
    Sphere::new().attach_to(&mut scene).unwrap();

    let mut renderer = HeadlessRenderer::new();
    let err = scene.run_with(&mut renderer).unwrap_err();
    assert!(matches!(err, IsoviewError::Setup(_)), "{err:?}");
    assert_eq!(renderer.num_windows(), 0);
    assert!(renderer.last_frame().is_none());
}

#[test]
fn test_user_camera_is_used_for_the_frame() {
    let render = |camera: Option<CameraView>| {
        let mut scene = Scene::with_options(SceneOptions {
            save_on_exit: false,
            camera,
            ..small_options("camera")
        });
        Arrow::from_origin(DVec3::new(0.0, 0.0, 0.3), DVec3::new(0.8, 0.0, 0.0))
            .attach_to(&mut scene)
            .unwrap();
        let mut renderer = HeadlessRenderer::new();
        scene.run_with(&mut renderer).unwrap();
        renderer.last_frame().unwrap().clone()
    };

    let default_view = render(None);
    let side_view = render(Some(CameraView::new(
        DVec3::Z,
        DVec3::ZERO,
        DVec3::new(0.0, -4.0, 0.0),
    )));
    assert!(side_view.has_content());
    assert_ne!(default_view, side_view);
    // seen from -y with z up, +x points right: the red arrow is right of the origin
    let is_red = |p: [u8; 4]| p[0] > 200 && p[1] < 80 && p[2] < 80;
    let mid = side_view.width / 2;
    let red_columns: Vec<u32> = (0..side_view.width)
        .filter(|&x| {
            (0..side_view.height).any(|y| side_view.pixel(x, y).is_some_and(is_red))
        })
        .collect();
    assert!(!red_columns.is_empty());
    assert!(red_columns.iter().all(|&x| x + 3 >= mid), "{red_columns:?}");
    assert!(red_columns.iter().any(|&x| x > mid + 10));
}
