//! The renderer boundary.

use isoview_core::handle::{
    ArrowHandle, IsoSurfaceHandle, NativeHandle, SphereHandle, SphereSetHandle, WindowHandle,
};
use isoview_core::options::SceneOptions;
use isoview_structures::{Arrow, IsoSurface, Sphere, SphereSet};

/// A native visualization backend.
///
/// Every allocating call returns `None` on failure. Handles returned by a
/// renderer stay valid until passed to [`Renderer::release`]; the caller
/// releases each one exactly once, window last.
///
/// During [`Renderer::run_or_display`] a renderer obtains isosurface field
/// values through [`isoview_core::callback::sample`] (or the lower-level
/// `set_active_index`/`set_input`/`evaluate`/`output` sequence) using the
/// callback index it was given in [`Renderer::add_isosurface`].
pub trait Renderer {
    /// Allocates a window (scene context).
    ///
    /// Uses the window size and the camera direction from `options`.
    fn allocate_window(&mut self, options: &SceneOptions) -> Option<WindowHandle>;

    /// Adds an arrow to a window.
    fn add_arrow(&mut self, window: WindowHandle, arrow: &Arrow) -> Option<ArrowHandle>;

    /// Adds a single sphere to a window.
    fn add_sphere(&mut self, window: WindowHandle, sphere: &Sphere) -> Option<SphereHandle>;

    /// Adds a set of spheres to a window. The set has already been validated.
    fn add_sphere_set(&mut self, window: WindowHandle, set: &SphereSet)
        -> Option<SphereSetHandle>;

    /// Adds an isosurface whose field function is published at `callback_index`.
    fn add_isosurface(
        &mut self,
        window: WindowHandle,
        callback_index: usize,
        iso: &IsoSurface,
    ) -> Option<IsoSurfaceHandle>;

    /// Shows the window interactively or renders it once, then returns.
    ///
    /// Returns zero on success and a nonzero status otherwise.
    fn run_or_display(&mut self, window: WindowHandle, options: &SceneOptions) -> i32;

    /// Frees a resource.
    fn release(&mut self, handle: NativeHandle);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn allocate_window(&mut self, options: &SceneOptions) -> Option<WindowHandle> {
        (**self).allocate_window(options)
    }

    fn add_arrow(&mut self, window: WindowHandle, arrow: &Arrow) -> Option<ArrowHandle> {
        (**self).add_arrow(window, arrow)
    }

    fn add_sphere(&mut self, window: WindowHandle, sphere: &Sphere) -> Option<SphereHandle> {
        (**self).add_sphere(window, sphere)
    }

    fn add_sphere_set(
        &mut self,
        window: WindowHandle,
        set: &SphereSet,
    ) -> Option<SphereSetHandle> {
        (**self).add_sphere_set(window, set)
    }

    fn add_isosurface(
        &mut self,
        window: WindowHandle,
        callback_index: usize,
        iso: &IsoSurface,
    ) -> Option<IsoSurfaceHandle> {
        (**self).add_isosurface(window, callback_index, iso)
    }

    fn run_or_display(&mut self, window: WindowHandle, options: &SceneOptions) -> i32 {
        (**self).run_or_display(window, options)
    }

    fn release(&mut self, handle: NativeHandle) {
        (**self).release(handle);
    }
}

/// Hands out consecutive non-zero identifiers.
#[derive(Debug, Clone)]
pub struct HandleAllocator {
    next: u64,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl HandleAllocator {
    /// Returns the next raw identifier.
    pub fn next_raw(&mut self) -> u64 {
        let raw = self.next;
        self.next += 1;
        raw
    }

    /// Returns a fresh typed handle.
    pub fn fresh<H>(&mut self, wrap: impl FnOnce(u64) -> Option<H>) -> Option<H> {
        wrap(self.next_raw())
    }
}
