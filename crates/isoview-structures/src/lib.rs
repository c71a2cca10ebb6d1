//! Drawable descriptors for isoview.
//!
//! This crate provides the configuration records a scene is composed of:
//! - [`Arrow`]
//! - [`Sphere`]
//! - [`SphereSet`] (optionally loaded from a table file)
//! - [`IsoSurface`] (sampled from a user field function)
//!
//! Each descriptor carries one native-handle slot, filled while a render pass
//! has the drawable registered with a renderer and cleared at teardown.

// Geometry code intentionally uses casts for indices and coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod arrow;
pub mod drawable;
pub mod isosurface;
pub mod sphere;
pub mod sphere_set;
pub mod table;

pub use arrow::Arrow;
pub use drawable::Drawable;
pub use isosurface::{ColormapRangeMode, ColormapSpec, IsoSurface};
pub use sphere::Sphere;
pub use sphere_set::SphereSet;
pub use table::Table;
