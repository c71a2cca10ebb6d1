//! Isosurface descriptor.
//!
//! An isosurface is sampled from a user field function over a regular grid
//! spanning an axis-aligned box. The function is not called here: a renderer
//! evaluates it through the callback registry while building the surface.

use std::fmt;
use std::sync::Arc;

use glam::{DVec3, UVec3, Vec4};
use isoview_core::callback::{FieldFn, FieldSample};
use isoview_core::error::{IsoviewError, Result};
use isoview_core::handle::{DrawableKind, IsoSurfaceHandle};

use crate::drawable::Drawable;

/// Which range a colormap is stretched over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColormapRangeMode {
    /// Range of the field values sampled on the grid.
    #[default]
    FieldRange,
    /// The isosurface level range.
    LevelRange,
    /// The explicit colormap range.
    Explicit,
}

/// Colormap selection of an isosurface.
#[derive(Debug, Clone, PartialEq)]
pub struct ColormapSpec {
    /// Colormap name, e.g. "warm".
    pub name: String,
    /// Number of colors. Zero means the fixed isosurface color is used.
    pub num_colors: u32,
    /// Which range the colormap covers.
    pub range_mode: ColormapRangeMode,
    /// Explicit range, used with [`ColormapRangeMode::Explicit`].
    pub range: (f64, f64),
}

impl Default for ColormapSpec {
    fn default() -> Self {
        Self {
            name: "warm".to_string(),
            num_colors: 16,
            range_mode: ColormapRangeMode::FieldRange,
            range: (0.0, 1.0),
        }
    }
}

/// A surface of constant value of a scalar field.
#[derive(Clone)]
pub struct IsoSurface {
    /// Minimum corner of the sampling box.
    pub bound_min: DVec3,
    /// Maximum corner of the sampling box.
    pub bound_max: DVec3,
    /// Number of grid nodes along each axis. All must be at least 2.
    pub divisions: UVec3,
    /// Minimum and maximum isosurface levels.
    pub level_range: (f64, f64),
    /// Interpret grid coordinates as octahedral `(p, q, theta)` values.
    pub oct_rotate: bool,
    /// Number of levels. 0 or 1 means a single level at `level_range.0`.
    pub num_levels: u32,
    /// Colormap selection.
    pub colormap: ColormapSpec,
    /// Fixed color as (red, green, blue, opacity). Opacity is always used.
    pub color: Vec4,
    /// Show the wireframe of the surface.
    pub show_wireframe: bool,
    /// Show the points of the sampling grid.
    pub show_grid_points: bool,

    field: FieldFn,
    handle: Option<IsoSurfaceHandle>,
}

impl IsoSurface {
    /// Creates an isosurface of `f` with default sampling and appearance.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(DVec3) -> FieldSample + Send + Sync + 'static,
    {
        Self::from_field(Arc::new(f))
    }

    /// Creates an isosurface from a shared field function.
    pub fn from_field(field: FieldFn) -> Self {
        Self {
            bound_min: DVec3::splat(-1.0),
            bound_max: DVec3::splat(1.0),
            divisions: UVec3::splat(21),
            level_range: (0.0, 1.0),
            oct_rotate: false,
            num_levels: 1,
            colormap: ColormapSpec::default(),
            color: Vec4::new(0.0, 0.0, 1.0, 1.0),
            show_wireframe: false,
            show_grid_points: false,
            field,
            handle: None,
        }
    }

    /// Returns the field function.
    pub fn field(&self) -> &FieldFn {
        &self.field
    }

    /// Replaces the field function.
    pub fn set_field(&mut self, field: FieldFn) {
        self.field = field;
    }

    /// Sets the sampling box, returning self for chaining.
    #[must_use]
    pub fn with_bounds(mut self, bound_min: DVec3, bound_max: DVec3) -> Self {
        self.bound_min = bound_min;
        self.bound_max = bound_max;
        self
    }

    /// Sets the grid divisions, returning self for chaining.
    #[must_use]
    pub fn with_divisions(mut self, divisions: UVec3) -> Self {
        self.divisions = divisions;
        self
    }

    /// Checks the grid divisions.
    pub fn validate(&self) -> Result<()> {
        let d = self.divisions;
        if d.x < 2 || d.y < 2 || d.z < 2 {
            return Err(IsoviewError::Configuration(format!(
                "isosurface divisions must all be at least 2, got ({}, {}, {})",
                d.x, d.y, d.z
            )));
        }
        Ok(())
    }

    /// Returns the total number of grid nodes.
    pub fn num_nodes(&self) -> usize {
        self.divisions.x as usize * self.divisions.y as usize * self.divisions.z as usize
    }

    /// Returns the distance between adjacent grid nodes.
    pub fn grid_spacing(&self) -> DVec3 {
        let cells = (self.divisions.as_dvec3() - DVec3::ONE).max(DVec3::ONE);
        (self.bound_max - self.bound_min) / cells
    }

    /// Returns the grid coordinates of node `(i, j, k)`.
    pub fn node_position(&self, i: u32, j: u32, k: u32) -> DVec3 {
        self.bound_min + DVec3::new(f64::from(i), f64::from(j), f64::from(k)) * self.grid_spacing()
    }

    /// Returns the isosurface levels.
    ///
    /// With 0 or 1 levels the single level is `level_range.0`. Otherwise the
    /// levels are evenly spaced over `level_range`, or over `field_range` when
    /// the level range is degenerate.
    pub fn levels(&self, field_range: (f64, f64)) -> Vec<f64> {
        if self.num_levels <= 1 {
            return vec![self.level_range.0];
        }
        let (lo, hi) = if (self.level_range.1 - self.level_range.0).abs() > 1e-10 {
            self.level_range
        } else {
            field_range
        };
        let n = self.num_levels;
        let step = (hi - lo) / f64::from(n - 1);
        (0..n).map(|i| lo + f64::from(i) * step).collect()
    }
}

impl Drawable for IsoSurface {
    type Handle = IsoSurfaceHandle;

    fn kind(&self) -> DrawableKind {
        DrawableKind::IsoSurface
    }

    fn handle(&self) -> Option<IsoSurfaceHandle> {
        self.handle
    }

    fn set_handle(&mut self, handle: Option<IsoSurfaceHandle>) {
        self.handle = handle;
    }

    fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        if self.oct_rotate {
            // Sampling coordinates are not world coordinates.
            return None;
        }
        Some((
            self.bound_min.min(self.bound_max),
            self.bound_min.max(self.bound_max),
        ))
    }
}

impl fmt::Debug for IsoSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IsoSurface")
            .field("bound_min", &self.bound_min)
            .field("bound_max", &self.bound_max)
            .field("divisions", &self.divisions)
            .field("level_range", &self.level_range)
            .field("oct_rotate", &self.oct_rotate)
            .field("num_levels", &self.num_levels)
            .field("colormap", &self.colormap)
            .field("color", &self.color)
            .field("show_wireframe", &self.show_wireframe)
            .field("show_grid_points", &self.show_grid_points)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_field(x: DVec3) -> FieldSample {
        FieldSample::new(x.length_squared(), 2.0 * x)
    }

    #[test]
    fn test_isosurface_defaults() {
        let iso = IsoSurface::new(sphere_field);
        assert_eq!(iso.bound_min, DVec3::splat(-1.0));
        assert_eq!(iso.bound_max, DVec3::splat(1.0));
        assert_eq!(iso.divisions, UVec3::new(21, 21, 21));
        assert_eq!(iso.level_range, (0.0, 1.0));
        assert_eq!(iso.num_levels, 1);
        assert_eq!(iso.colormap.name, "warm");
        assert_eq!(iso.colormap.num_colors, 16);
        assert_eq!(iso.colormap.range_mode, ColormapRangeMode::FieldRange);
        assert_eq!(iso.colormap.range, (0.0, 1.0));
        assert_eq!(iso.color, Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert!(!iso.show_wireframe && !iso.show_grid_points && !iso.oct_rotate);
    }

    #[test]
    fn test_field_is_retrievable() {
        let f: FieldFn = Arc::new(sphere_field);
        let iso = IsoSurface::from_field(Arc::clone(&f));
        assert!(Arc::ptr_eq(iso.field(), &f));
        assert_eq!((iso.field())(DVec3::new(1.0, 2.0, 2.0)).value, 9.0);

        let copy = iso.clone();
        assert!(Arc::ptr_eq(copy.field(), &f));
    }

    #[test]
    fn test_validate_divisions() {
        let iso = IsoSurface::new(sphere_field);
        assert!(iso.validate().is_ok());
        let iso = iso.with_divisions(UVec3::new(2, 1, 2));
        assert!(matches!(iso.validate(), Err(IsoviewError::Configuration(_))));
    }

    #[test]
    fn test_grid_nodes() {
        let iso = IsoSurface::new(sphere_field).with_divisions(UVec3::new(3, 5, 2));
        assert_eq!(iso.num_nodes(), 30);
        assert_eq!(iso.node_position(0, 0, 0), DVec3::splat(-1.0));
        assert_eq!(iso.node_position(2, 4, 1), DVec3::splat(1.0));
        assert_eq!(iso.node_position(1, 2, 0), DVec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_levels() {
        let mut iso = IsoSurface::new(sphere_field);
        iso.level_range = (0.25, 0.75);
        assert_eq!(iso.levels((0.0, 3.0)), vec![0.25]);

        iso.num_levels = 0;
        assert_eq!(iso.levels((0.0, 3.0)), vec![0.25]);

        iso.num_levels = 3;
        assert_eq!(iso.levels((0.0, 3.0)), vec![0.25, 0.5, 0.75]);

        iso.level_range = (1.0, 1.0);
        assert_eq!(iso.levels((0.0, 3.0)), vec![0.0, 1.5, 3.0]);
    }

    #[test]
    fn test_octahedral_grid_has_no_world_bounds() {
        let mut iso = IsoSurface::new(sphere_field);
        assert!(iso.bounding_box().is_some());
        iso.oct_rotate = true;
        assert!(iso.bounding_box().is_none());
    }
}
