//! isoview: 3D scenes of arrows, spheres and isosurfaces.
//!
//! A [`Scene`] collects drawable descriptors and renders them in one pass
//! through a [`Renderer`]. Isosurfaces are defined by a scalar field function
//! that the renderer evaluates, while the pass runs, through the process-wide
//! [`callback`] registry.
//!
//! # Quick Start
//!
//! ```no_run
//! use isoview::*;
//!
//! fn main() -> Result<()> {
//!     let mut scene = Scene::with_options(SceneOptions {
//!         interact: false,
//!         save_on_exit: true,
//!         file_key: "sphere".to_string(),
//!         ..SceneOptions::default()
//!     });
//!
//!     // f(x) = |x|^2, whose level sets are spheres
//!     let mut iso = IsoSurface::new(|x: DVec3| FieldSample::new(x.length_squared(), 2.0 * x));
//!     iso.level_range = (0.5, 0.5);
//!     iso.attach_to(&mut scene)?;
//!
//!     Arrow::from_origin(DVec3::ZERO, DVec3::X).attach_to(&mut scene)?;
//!
//!     // Writes sphere.png
//!     scene.run()
//! }
//! ```
//!
//! # Render passes
//!
//! [`Scene::run_with`] allocates a window, registers arrows, spheres, sphere
//! sets and isosurfaces in that order, runs the renderer and releases every
//! handle in reverse order, also when a step fails. Only one pass runs at a
//! time per process; passes started from other threads wait.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

mod pass;
mod scene;

pub use scene::{Attach, Scene};

// Re-export core types
pub use isoview_core::{
    callback,
    callback::{CallbackRegistry, FieldFn, FieldSample},
    error::{IsoviewError, Result},
    handle::{
        ArrowHandle, DrawableKind, IsoSurfaceHandle, NativeHandle, SphereHandle,
        SphereSetHandle, WindowHandle,
    },
    options::{CameraView, SceneOptions},
    DVec3, UVec3, Vec3, Vec4,
};

// Re-export render types
pub use isoview_render::{
    ColorMap, ColorMapRegistry, Frame, HeadlessRenderer, RecordingRenderer, Renderer,
    RendererCall,
};

// Re-export structures
pub use isoview_structures::{
    Arrow, ColormapRangeMode, ColormapSpec, Drawable, IsoSurface, Sphere, SphereSet, Table,
};

/// Initializes logging through `env_logger`.
///
/// Reads the `RUST_LOG` environment variable. Calling it more than once, or
/// after another logger was installed, has no effect.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
