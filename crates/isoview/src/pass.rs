//! A single render pass.
//!
//! A pass allocates a window, registers every drawable of the scene in a
//! fixed order (arrows, spheres, sphere sets, isosurfaces), publishes the
//! field function of each isosurface in the callback registry, hands control
//! to the renderer, and finally releases everything it obtained in reverse
//! order. Release happens in [`Teardown`]'s destructor, so it also runs when
//! setup fails half way or the renderer panics.

use std::sync::Arc;

use isoview_core::callback::{self, PassGuard};
use isoview_core::error::{IsoviewError, Result};
use isoview_core::handle::NativeHandle;
use isoview_render::Renderer;
use isoview_structures::Drawable;

use crate::scene::Scene;

/// Releases every handle obtained during a pass, newest first, then clears
/// the handle slots of the scene's descriptors.
struct Teardown<'a, R: Renderer + ?Sized> {
    scene: &'a mut Scene,
    renderer: &'a mut R,
    obligations: Vec<NativeHandle>,
}

impl<'a, R: Renderer + ?Sized> Teardown<'a, R> {
    fn new(scene: &'a mut Scene, renderer: &'a mut R) -> Self {
        Self {
            scene,
            renderer,
            obligations: Vec::new(),
        }
    }
}

impl<R: Renderer + ?Sized> Drop for Teardown<'_, R> {
    fn drop(&mut self) {
        log::debug!("tearing down {} handle(s)", self.obligations.len());
        while let Some(handle) = self.obligations.pop() {
            self.renderer.release(handle);
        }
        self.scene.clear_handles();
    }
}

/// Stores a handle returned by the renderer on its descriptor.
fn bind<D: Drawable>(
    drawable: &mut D,
    handle: Option<D::Handle>,
    obligations: &mut Vec<NativeHandle>,
) -> Result<()> {
    let handle = handle.ok_or_else(|| {
        IsoviewError::Setup(format!("renderer failed to add {}", drawable.kind()))
    })?;
    drawable.set_handle(Some(handle));
    obligations.push(handle.into());
    Ok(())
}

fn execute<R: Renderer + ?Sized>(t: &mut Teardown<'_, R>, pass: &PassGuard) -> Result<i32> {
    let options = t.scene.options().clone();

    let window = t
        .renderer
        .allocate_window(&options)
        .ok_or_else(|| IsoviewError::Setup("cannot allocate window".to_string()))?;
    t.obligations.push(window.into());
    log::debug!("allocated {window}");

    for arrow in &mut t.scene.arrows {
        let handle = t.renderer.add_arrow(window, arrow);
        bind(arrow, handle, &mut t.obligations)?;
    }
    for sphere in &mut t.scene.spheres {
        let handle = t.renderer.add_sphere(window, sphere);
        bind(sphere, handle, &mut t.obligations)?;
    }
    for (i, set) in t.scene.sphere_sets.iter_mut().enumerate() {
        if set.validate()? == 0 {
            log::debug!("skipping empty sphere set {i}");
            continue;
        }
        let handle = t.renderer.add_sphere_set(window, set);
        bind(set, handle, &mut t.obligations)?;
    }
    log::debug!(
        "registered {} arrow(s), {} sphere(s), {} sphere set(s)",
        t.scene.arrows.len(),
        t.scene.spheres.len(),
        t.scene.sphere_sets.len()
    );

    for iso in &mut t.scene.isosurfaces {
        iso.validate()?;
        let index = pass.register(Arc::clone(iso.field()));
        let handle = t.renderer.add_isosurface(window, index, iso);
        bind(iso, handle, &mut t.obligations)?;
    }

    log::debug!("running renderer");
    Ok(t.renderer.run_or_display(window, &options))
}

/// Runs one pass of `scene` against `renderer`.
///
/// Blocks while another thread runs a pass. Every handle obtained is
/// released before this returns, whatever the outcome. A nonzero status from
/// the renderer is reported in preference to a field function failure.
pub(crate) fn run<R: Renderer + ?Sized>(scene: &mut Scene, renderer: &mut R) -> Result<()> {
    let pass = callback::begin_pass()?;

    let mut teardown = Teardown::new(scene, renderer);
    let result = execute(&mut teardown, &pass);
    drop(teardown);

    let status = result?;
    if status != 0 {
        log::error!("renderer finished with status {status}");
        return Err(IsoviewError::Execution(status));
    }
    if let Some(failure) = pass.take_failure() {
        return Err(failure);
    }
    log::info!("render pass finished");
    Ok(())
}
