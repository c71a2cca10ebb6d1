//! Rendering backends for isoview.
//!
//! This crate provides the boundary between a scene and a native renderer:
//! - The [`Renderer`] trait (allocate window, add drawables, run/display, release)
//! - [`RecordingRenderer`], which logs calls and injects failures
//! - [`HeadlessRenderer`], a software renderer that samples isosurface fields
//!   through the callback registry and writes PNG images
//! - Color maps shared by the renderers

// Raster code intentionally converts between pixel and world coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod color_maps;
pub mod headless;
pub mod recording;
pub mod renderer;

pub use color_maps::{ColorMap, ColorMapRegistry, LookupTable};
pub use headless::{Frame, HeadlessRenderer, MAX_FRAME_PIXELS};
pub use recording::{Probe, RecordingRenderer, RendererCall};
pub use renderer::{HandleAllocator, Renderer};
