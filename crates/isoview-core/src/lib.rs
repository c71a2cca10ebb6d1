//! Core abstractions for isoview.
//!
//! This crate provides the fundamental types shared by every other isoview crate:
//! - [`IsoviewError`] and the crate-wide [`Result`] alias
//! - Typed native handles ([`WindowHandle`], [`ArrowHandle`], ...) and the
//!   [`NativeHandle`] tag used for ordered release
//! - The [`callback`] registry through which a renderer evaluates user field
//!   functions during isosurface extraction
//! - [`SceneOptions`], the configuration of a single render pass

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]

pub mod callback;
pub mod error;
pub mod handle;
pub mod options;

pub use callback::{CallbackRegistry, FieldFn, FieldSample, PassGuard};
pub use error::{IsoviewError, Result};
pub use handle::{
    ArrowHandle, DrawableKind, IsoSurfaceHandle, NativeHandle, SphereHandle, SphereSetHandle,
    WindowHandle,
};
pub use options::{CameraView, SceneOptions};

// Re-export glam types for convenience
pub use glam::{DVec3, UVec3, Vec3, Vec4};
