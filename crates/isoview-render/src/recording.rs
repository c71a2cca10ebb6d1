//! A renderer that records calls instead of drawing.
//!
//! [`RecordingRenderer`] keeps an ordered log of every call made through the
//! [`Renderer`] trait, tracks which handles are live, and can be told to fail
//! in specific ways. It is what the pass orchestration is tested against.

use glam::DVec3;
use isoview_core::callback::{self, FieldSample};
use isoview_core::handle::{
    ArrowHandle, DrawableKind, IsoSurfaceHandle, NativeHandle, SphereHandle, SphereSetHandle,
    WindowHandle,
};
use isoview_core::options::SceneOptions;
use isoview_structures::{Arrow, IsoSurface, Sphere, SphereSet};

use crate::renderer::{HandleAllocator, Renderer};

/// One call received by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RendererCall {
    AllocateWindow {
        axes_len: f64,
        reverse: bool,
        width: u32,
        height: u32,
    },
    AddArrow {
        window: WindowHandle,
        origin: DVec3,
        vector: DVec3,
    },
    AddSphere {
        window: WindowHandle,
        center: DVec3,
        radius: f64,
    },
    AddSphereSet {
        window: WindowHandle,
        count: usize,
    },
    AddIsoSurface {
        window: WindowHandle,
        callback_index: usize,
    },
    RunOrDisplay {
        window: WindowHandle,
        interact: bool,
        save_on_exit: bool,
        file_key: String,
    },
    Release(NativeHandle),
}

/// A field evaluation made while probing bound callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub callback_index: usize,
    pub point: DVec3,
    pub sample: FieldSample,
}

/// Records calls, tracks live handles and injects failures.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RendererCall>,
    live: Vec<NativeHandle>,
    ids: HandleAllocator,
    bound: Vec<usize>,

    fail_window: bool,
    reject: Option<DrawableKind>,
    run_status: i32,
    probe_points: Vec<DVec3>,
    probes: Vec<Probe>,
}

impl RecordingRenderer {
    /// Creates a renderer that accepts every call and returns status 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes window allocation fail.
    #[must_use]
    pub fn with_window_failure(mut self) -> Self {
        self.fail_window = true;
        self
    }

    /// Makes `run_or_display` return `status`.
    #[must_use]
    pub fn with_run_status(mut self, status: i32) -> Self {
        self.run_status = status;
        self
    }

    /// Makes every add call for `kind` fail.
    #[must_use]
    pub fn rejecting(mut self, kind: DrawableKind) -> Self {
        self.reject = Some(kind);
        self
    }

    /// Evaluates every bound isosurface callback at `points` during run/display.
    #[must_use]
    pub fn with_probe_points(mut self, points: Vec<DVec3>) -> Self {
        self.probe_points = points;
        self
    }

    /// Returns every call received so far, in order.
    pub fn calls(&self) -> &[RendererCall] {
        &self.calls
    }

    /// Returns the handles allocated and not yet released, in allocation order.
    pub fn live_handles(&self) -> &[NativeHandle] {
        &self.live
    }

    /// Returns the released handles in release order.
    pub fn released(&self) -> Vec<NativeHandle> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RendererCall::Release(h) => Some(*h),
                _ => None,
            })
            .collect()
    }

    /// Returns the callback indices passed to `add_isosurface`, in order.
    pub fn callback_indices(&self) -> &[usize] {
        &self.bound
    }

    /// Returns the evaluations made while probing.
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Forgets all recorded calls and probes. Live handles are kept.
    pub fn clear_log(&mut self) {
        self.calls.clear();
        self.bound.clear();
        self.probes.clear();
    }

    fn allocate<H>(&mut self, kind: DrawableKind, wrap: fn(u64) -> Option<H>) -> Option<H>
    where
        H: Copy + Into<NativeHandle>,
    {
        if self.reject == Some(kind) {
            log::error!("recording renderer: rejecting {kind}");
            return None;
        }
        let handle = self.ids.fresh(wrap)?;
        self.live.push(handle.into());
        Some(handle)
    }
}

impl Renderer for RecordingRenderer {
    fn allocate_window(&mut self, options: &SceneOptions) -> Option<WindowHandle> {
        self.calls.push(RendererCall::AllocateWindow {
            axes_len: options.axes_len,
            reverse: options.reverse,
            width: options.width,
            height: options.height,
        });
        if self.fail_window {
            log::error!("recording renderer: window allocation failed");
            return None;
        }
        self.allocate(DrawableKind::Window, WindowHandle::from_raw)
    }

    fn add_arrow(&mut self, window: WindowHandle, arrow: &Arrow) -> Option<ArrowHandle> {
        self.calls.push(RendererCall::AddArrow {
            window,
            origin: arrow.origin,
            vector: arrow.vector,
        });
        self.allocate(DrawableKind::Arrow, ArrowHandle::from_raw)
    }

    fn add_sphere(&mut self, window: WindowHandle, sphere: &Sphere) -> Option<SphereHandle> {
        self.calls.push(RendererCall::AddSphere {
            window,
            center: sphere.center,
            radius: sphere.radius,
        });
        self.allocate(DrawableKind::Sphere, SphereHandle::from_raw)
    }

    fn add_sphere_set(
        &mut self,
        window: WindowHandle,
        set: &SphereSet,
    ) -> Option<SphereSetHandle> {
        self.calls.push(RendererCall::AddSphereSet {
            window,
            count: set.len(),
        });
        self.allocate(DrawableKind::SphereSet, SphereSetHandle::from_raw)
    }

    fn add_isosurface(
        &mut self,
        window: WindowHandle,
        callback_index: usize,
        _iso: &IsoSurface,
    ) -> Option<IsoSurfaceHandle> {
        self.calls.push(RendererCall::AddIsoSurface {
            window,
            callback_index,
        });
        let handle = self.allocate(DrawableKind::IsoSurface, IsoSurfaceHandle::from_raw)?;
        self.bound.push(callback_index);
        Some(handle)
    }

    fn run_or_display(&mut self, window: WindowHandle, options: &SceneOptions) -> i32 {
        self.calls.push(RendererCall::RunOrDisplay {
            window,
            interact: options.interact,
            save_on_exit: options.save_on_exit,
            file_key: options.file_key.clone(),
        });
        for &callback_index in &self.bound {
            for &point in &self.probe_points {
                let sample = callback::sample(callback_index, point);
                self.probes.push(Probe {
                    callback_index,
                    point,
                    sample,
                });
            }
        }
        self.run_status
    }

    fn release(&mut self, handle: NativeHandle) {
        self.calls.push(RendererCall::Release(handle));
        match self.live.iter().position(|h| *h == handle) {
            Some(i) => {
                self.live.remove(i);
            }
            None => log::warn!("recording renderer: release of unknown handle {handle}"),
        }
    }
}
