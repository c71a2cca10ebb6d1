//! Headless software renderer.
//!
//! [`HeadlessRenderer`] implements [`Renderer`] without a display: windows
//! are in-memory scenes, `run_or_display` rasterizes one frame and, when
//! asked to, writes it as a PNG. Isosurfaces are sampled through the callback
//! registry when they are added, which is where the field functions of a
//! scene are evaluated.

pub mod camera;
pub mod grid;
pub mod raster;

use std::f64::consts::TAU;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use glam::{DVec3, Vec3, Vec4};
use image::{ImageFormat, RgbaImage};
use isoview_core::error::Result;
use isoview_core::handle::{
    ArrowHandle, IsoSurfaceHandle, NativeHandle, SphereHandle, SphereSetHandle, WindowHandle,
};
use isoview_core::options::SceneOptions;
use isoview_structures::{Arrow, Drawable, IsoSurface, Sphere, SphereSet};

use crate::color_maps::ColorMapRegistry;
use crate::renderer::{HandleAllocator, Renderer};

pub use camera::Camera;
pub use grid::{pqth_to_principal, IsoSurfaceModel, SampledGrid};
pub use raster::Canvas;

const BACKGROUND: Vec3 = Vec3::ONE;
const AXES_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
const PLANE_COLOR: Vec4 = Vec4::new(1.0, 0.5, 0.0, 0.05);
const GRID_POINT_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Largest frame, in pixels after magnification, a window may produce.
pub const MAX_FRAME_PIXELS: u64 = 1 << 24;

/// A rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, rows top to bottom.
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Returns the RGBA value of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels.get(i..i + 4)?.try_into().ok()
    }

    /// Returns true if any pixel differs from the background.
    pub fn has_content(&self) -> bool {
        self.pixels.chunks_exact(4).any(|p| p != [255, 255, 255, 255])
    }

    /// Encodes the frame as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "{} bytes do not make a {}x{} RGBA frame",
                        self.pixels.len(),
                        self.width,
                        self.height
                    ),
                )
            })?;
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(io::Error::other)?;
        Ok(png.into_inner())
    }

    /// Writes the frame to `path` as PNG, whatever the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_png()?)?;
        log::info!("file <{}> written", path.display());
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Item {
    Arrow(Arrow),
    Sphere(Sphere),
    SphereSet(SphereSet),
    IsoSurface(IsoSurfaceModel),
}

#[derive(Debug, Clone)]
struct Window {
    handle: WindowHandle,
    camera: Camera,
    /// The camera was placed by the user and only its scale is fitted.
    fixed_camera: bool,
    width: u32,
    height: u32,
    magnification: u32,
    items: Vec<(NativeHandle, Item)>,
}

/// A drawing primitive in world coordinates.
#[derive(Debug, Clone, Copy)]
enum Primitive {
    /// Segment with a width in pixels.
    Line { a: DVec3, b: DVec3, width: f64, color: Vec4 },
    /// Segment with a radius in world units.
    Tube { a: DVec3, b: DVec3, radius: f64, color: Vec4 },
    /// Flat dot with a radius in pixels.
    Dot { center: DVec3, radius: f64, color: Vec4 },
    /// Shaded sphere with a radius in world units.
    Ball { center: DVec3, radius: f64, color: Vec4 },
    Triangle { a: DVec3, b: DVec3, c: DVec3, color: Vec4 },
}

impl Primitive {
    fn color(self) -> Vec4 {
        match self {
            Self::Line { color, .. }
            | Self::Tube { color, .. }
            | Self::Dot { color, .. }
            | Self::Ball { color, .. }
            | Self::Triangle { color, .. } => color,
        }
    }
}

/// Returns the axis segments and, optionally, the hydrostatic line.
///
/// With full axes every segment runs from `-c` to `c`; otherwise from the
/// origin to `c`, where `c` is the axis length, negated when the view is
/// reversed and only the positive half is shown.
pub fn axes_segments(options: &SceneOptions) -> Vec<(DVec3, DVec3)> {
    let len = options.axes_len;
    let c = if options.reverse && !options.full_axes {
        -len
    } else {
        len
    };
    let mut dirs = vec![DVec3::X, DVec3::Y, DVec3::Z];
    if options.hydro_line {
        dirs.push(DVec3::ONE);
    }
    dirs.into_iter()
        .map(|d| {
            let start = if options.full_axes { -c * d } else { DVec3::ZERO };
            (start, c * d)
        })
        .collect()
}

/// Returns the three auxiliary planes through the origin as triangles.
fn plane_triangles(len: f64) -> Vec<[DVec3; 3]> {
    let quads = [
        [
            DVec3::new(-len, -len, 0.0),
            DVec3::new(len, -len, 0.0),
            DVec3::new(len, len, 0.0),
            DVec3::new(-len, len, 0.0),
        ],
        [
            DVec3::new(0.0, -len, -len),
            DVec3::new(0.0, len, -len),
            DVec3::new(0.0, len, len),
            DVec3::new(0.0, -len, len),
        ],
        [
            DVec3::new(-len, 0.0, -len),
            DVec3::new(len, 0.0, -len),
            DVec3::new(len, 0.0, len),
            DVec3::new(-len, 0.0, len),
        ],
    ];
    quads
        .iter()
        .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
        .collect()
}

fn arrow_primitives(arrow: &Arrow, out: &mut Vec<Primitive>) {
    let color = arrow.color;
    let base = arrow.cone_base();
    out.push(Primitive::Tube {
        a: arrow.origin,
        b: base,
        radius: arrow.cylinder_radius,
        color,
    });

    let Some(axis) = arrow.vector.try_normalize() else {
        return;
    };
    let (u, v) = axis.any_orthonormal_pair();
    let n = arrow.resolution.max(3);
    let rim = |k: u32| {
        let phi = TAU * f64::from(k) / f64::from(n);
        base + arrow.cone_radius * (phi.cos() * u + phi.sin() * v)
    };
    let tip = arrow.tip();
    for k in 0..n {
        let (p, q) = (rim(k), rim(k + 1));
        out.push(Primitive::Triangle { a: tip, b: p, c: q, color });
        out.push(Primitive::Triangle { a: base, b: p, c: q, color });
    }
}

fn isosurface_primitives(model: &IsoSurfaceModel, spacing: f64, out: &mut Vec<Primitive>) {
    for &level in &model.levels {
        let color = model.level_color(level);
        for p in model.grid.crossings(level) {
            if model.show_wireframe {
                out.push(Primitive::Dot {
                    center: p,
                    radius: 1.0,
                    color,
                });
            } else {
                out.push(Primitive::Ball {
                    center: p,
                    radius: spacing * 0.5,
                    color,
                });
            }
        }
    }
    if model.show_grid_points {
        for &p in model.grid.points() {
            out.push(Primitive::Dot {
                center: p,
                radius: 2.0,
                color: GRID_POINT_COLOR,
            });
        }
    }
}

/// A renderer that draws into memory and writes PNG files.
#[derive(Debug)]
pub struct HeadlessRenderer {
    ids: HandleAllocator,
    windows: Vec<Window>,
    color_maps: ColorMapRegistry,
    output_dir: PathBuf,
    last_frame: Option<Frame>,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self {
            ids: HandleAllocator::default(),
            windows: Vec::new(),
            color_maps: ColorMapRegistry::new(),
            output_dir: PathBuf::from("."),
            last_frame: None,
        }
    }
}

impl HeadlessRenderer {
    /// Creates a renderer writing images to the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory saved images are written to.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Returns the directory saved images are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the frame produced by the last `run_or_display` call.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Returns the number of live windows.
    pub fn num_windows(&self) -> usize {
        self.windows.len()
    }

    /// Returns the number of live drawables across all windows.
    pub fn num_drawables(&self) -> usize {
        self.windows.iter().map(|w| w.items.len()).sum()
    }

    /// Returns the sampled state of a live isosurface.
    pub fn isosurface(&self, handle: IsoSurfaceHandle) -> Option<&IsoSurfaceModel> {
        let key = NativeHandle::from(handle);
        self.windows
            .iter()
            .flat_map(|w| &w.items)
            .find_map(|(h, item)| match item {
                Item::IsoSurface(model) if *h == key => Some(model),
                _ => None,
            })
    }

    fn window_index(&self, handle: WindowHandle) -> Option<usize> {
        let index = self.windows.iter().position(|w| w.handle == handle);
        if index.is_none() {
            log::error!("headless renderer: unknown window {handle}");
        }
        index
    }

    fn add_item<H>(
        &mut self,
        window: WindowHandle,
        wrap: fn(u64) -> Option<H>,
        item: Item,
    ) -> Option<H>
    where
        H: Copy + Into<NativeHandle>,
    {
        let index = self.window_index(window)?;
        let handle = self.ids.fresh(wrap)?;
        self.windows[index].items.push((handle.into(), item));
        Some(handle)
    }

    fn primitives(window: &Window, options: &SceneOptions) -> Vec<Primitive> {
        let mut out = Vec::new();

        for (a, b) in axes_segments(options) {
            out.push(Primitive::Line {
                a,
                b,
                width: 2.0,
                color: AXES_COLOR,
            });
        }
        if options.with_planes {
            for [a, b, c] in plane_triangles(options.axes_len) {
                out.push(Primitive::Triangle {
                    a,
                    b,
                    c,
                    color: PLANE_COLOR,
                });
            }
        }

        for (_, item) in &window.items {
            match item {
                Item::Arrow(arrow) => arrow_primitives(arrow, &mut out),
                Item::Sphere(sphere) => out.push(Primitive::Ball {
                    center: sphere.center,
                    radius: sphere.radius,
                    color: sphere.color,
                }),
                Item::SphereSet(set) => {
                    for (center, radius) in set.iter() {
                        out.push(Primitive::Ball {
                            center,
                            radius,
                            color: set.color,
                        });
                    }
                }
                Item::IsoSurface(model) => {
                    let spacing = grid_spacing(&model.grid);
                    isosurface_primitives(model, spacing, &mut out);
                }
            }
        }
        out
    }

    /// Returns points spanning everything the window shows.
    fn extent(window: &Window, options: &SceneOptions) -> Vec<DVec3> {
        let mut points = Vec::new();
        for (a, b) in axes_segments(options) {
            points.extend([a, b]);
        }
        if options.with_planes {
            for triangle in plane_triangles(options.axes_len) {
                points.extend(triangle);
            }
        }
        for (_, item) in &window.items {
            let bounds = match item {
                Item::Arrow(arrow) => arrow.bounding_box(),
                Item::Sphere(sphere) => sphere.bounding_box(),
                Item::SphereSet(set) => set.bounding_box(),
                Item::IsoSurface(model) => model.bounds,
            };
            if let Some((min, max)) = bounds {
                points.extend(box_corners(min, max));
            }
        }
        points.retain(|p| p.is_finite());
        points
    }

    fn render(window: &Window, options: &SceneOptions) -> Frame {
        let mag = window.magnification;
        let width = window.width * mag;
        let height = window.height * mag;
        let px = f64::from(mag);

        let primitives = Self::primitives(window, options);
        let extent = Self::extent(window, options);
        let aspect_ratio = f64::from(width) / f64::from(height);

        let mut camera = window.camera.clone();
        if window.fixed_camera {
            camera.fit_scale(&extent, aspect_ratio);
        } else {
            camera.look_at_points(&extent, aspect_ratio);
        }
        camera.zoom(options.zoom);
        let ppu = camera.pixels_per_unit(height);
        let project = |p: DVec3| camera.project(p, width, height);

        let mut canvas = Canvas::new(width, height, BACKGROUND);
        let (opaque, translucent): (Vec<_>, Vec<_>) =
            primitives.into_iter().partition(|p| p.color().w >= 1.0);
        for prim in opaque.iter().chain(&translucent) {
            match *prim {
                Primitive::Line {
                    a,
                    b,
                    width: w,
                    color,
                } => {
                    canvas.line(project(a), project(b), w * px, color);
                }
                Primitive::Tube { a, b, radius, color } => {
                    canvas.line(project(a), project(b), (2.0 * radius * ppu).max(px), color);
                }
                Primitive::Dot {
                    center,
                    radius,
                    color,
                } => canvas.point(project(center), radius * px, color),
                Primitive::Ball {
                    center,
                    radius,
                    color,
                } => canvas.ball(project(center), radius * ppu, 1.0 / ppu, color),
                Primitive::Triangle { a, b, c, color } => {
                    canvas.triangle(project(a), project(b), project(c), color);
                }
            }
        }

        Frame {
            width,
            height,
            pixels: canvas.to_rgba8(),
        }
    }
}

fn box_corners(min: DVec3, max: DVec3) -> [DVec3; 8] {
    [
        DVec3::new(min.x, min.y, min.z),
        DVec3::new(max.x, min.y, min.z),
        DVec3::new(min.x, max.y, min.z),
        DVec3::new(max.x, max.y, min.z),
        DVec3::new(min.x, min.y, max.z),
        DVec3::new(max.x, min.y, max.z),
        DVec3::new(min.x, max.y, max.z),
        DVec3::new(max.x, max.y, max.z),
    ]
}

fn grid_spacing(grid: &SampledGrid) -> f64 {
    let points = grid.points();
    match (points.first(), points.get(1)) {
        (Some(a), Some(b)) => a.distance(*b),
        _ => 0.0,
    }
}

impl Renderer for HeadlessRenderer {
    fn allocate_window(&mut self, options: &SceneOptions) -> Option<WindowHandle> {
        if options.width == 0 || options.height == 0 {
            log::error!(
                "headless renderer: cannot allocate a {}x{} window",
                options.width,
                options.height
            );
            return None;
        }
        let magnification = options.png_magnification.max(1);
        let pixels = u128::from(options.width)
            * u128::from(options.height)
            * u128::from(magnification)
            * u128::from(magnification);
        if pixels > u128::from(MAX_FRAME_PIXELS) {
            log::error!(
                "headless renderer: a {}x{} window magnified {magnification} times exceeds {MAX_FRAME_PIXELS} pixels",
                options.width,
                options.height
            );
            return None;
        }
        let (camera, fixed_camera) = match &options.camera {
            Some(view) => (Camera::from_view(view), true),
            None => (Camera::default_view(options.reverse), false),
        };

        let handle = self.ids.fresh(WindowHandle::from_raw)?;
        self.windows.push(Window {
            handle,
            camera,
            fixed_camera,
            width: options.width,
            height: options.height,
            magnification,
            items: Vec::new(),
        });
        log::debug!("headless renderer: allocated {handle}");
        Some(handle)
    }

    fn add_arrow(&mut self, window: WindowHandle, arrow: &Arrow) -> Option<ArrowHandle> {
        self.add_item(window, ArrowHandle::from_raw, Item::Arrow(arrow.clone()))
    }

    fn add_sphere(&mut self, window: WindowHandle, sphere: &Sphere) -> Option<SphereHandle> {
        self.add_item(window, SphereHandle::from_raw, Item::Sphere(sphere.clone()))
    }

    fn add_sphere_set(
        &mut self,
        window: WindowHandle,
        set: &SphereSet,
    ) -> Option<SphereSetHandle> {
        self.add_item(window, SphereSetHandle::from_raw, Item::SphereSet(set.clone()))
    }

    fn add_isosurface(
        &mut self,
        window: WindowHandle,
        callback_index: usize,
        iso: &IsoSurface,
    ) -> Option<IsoSurfaceHandle> {
        if let Err(e) = iso.validate() {
            log::error!("headless renderer: {e}");
            return None;
        }
        self.window_index(window)?;
        let model = IsoSurfaceModel::build(callback_index, iso, &self.color_maps);
        self.add_item(window, IsoSurfaceHandle::from_raw, Item::IsoSurface(model))
    }

    fn run_or_display(&mut self, window: WindowHandle, options: &SceneOptions) -> i32 {
        let Some(index) = self.window_index(window) else {
            return 1;
        };
        if options.interact {
            log::warn!("headless renderer: interactive mode is not available, rendering once");
        }

        let frame = Self::render(&self.windows[index], options);
        let mut status = 0;
        if options.save_on_exit {
            let path = self.output_dir.join(options.output_file_name());
            if let Err(e) = frame.save(&path) {
                log::error!("headless renderer: cannot write {}: {e}", path.display());
                status = 1;
            }
        }
        self.last_frame = Some(frame);
        status
    }

    fn release(&mut self, handle: NativeHandle) {
        if let NativeHandle::Window(h) = handle {
            if let Some(i) = self.windows.iter().position(|w| w.handle == h) {
                let window = self.windows.remove(i);
                if !window.items.is_empty() {
                    log::warn!(
                        "headless renderer: {h} released with {} drawable(s) still attached",
                        window.items.len()
                    );
                }
                return;
            }
        } else {
            for window in &mut self.windows {
                if let Some(i) = window.items.iter().position(|(h, _)| *h == handle) {
                    window.items.remove(i);
                    return;
                }
            }
        }
        log::warn!("headless renderer: release of unknown handle {handle}");
    }
}
