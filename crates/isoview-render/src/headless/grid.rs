//! Structured-grid sampling of isosurface fields.

use std::f64::consts::PI;

use glam::{DVec3, UVec3, Vec4};
use isoview_core::callback;
use isoview_structures::{ColormapRangeMode, Drawable, IsoSurface};

use crate::color_maps::{ColorMapRegistry, LookupTable};

/// Converts octahedral invariants `(p, q, theta)` to principal values.
///
/// `theta` is the Lode angle in radians.
pub fn pqth_to_principal(p: f64, q: f64, theta: f64) -> DVec3 {
    let r = 2.0 * q / 3.0;
    DVec3::new(
        -p + r * (theta - 2.0 * PI / 3.0).sin(),
        -p + r * theta.sin(),
        -p + r * (theta + 2.0 * PI / 3.0).sin(),
    )
}

/// Field values sampled at the nodes of a structured grid.
#[derive(Debug, Clone)]
pub struct SampledGrid {
    dims: UVec3,
    points: Vec<DVec3>,
    values: Vec<f64>,
    gradients: Vec<DVec3>,
    field_range: (f64, f64),
}

impl SampledGrid {
    /// Samples the field published at `callback_index` on the grid of `iso`.
    ///
    /// Each node is evaluated exactly once, `i` varying fastest, then `j`,
    /// then `k`. With octahedral rotation the node coordinates are converted
    /// to principal values first and the converted point is both the
    /// evaluation point and the drawn position.
    pub fn sample(callback_index: usize, iso: &IsoSurface) -> Self {
        let dims = iso.divisions;
        let n = iso.num_nodes();
        let mut points = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);
        let mut gradients = Vec::with_capacity(n);
        let mut range: Option<(f64, f64)> = None;

        for k in 0..dims.z {
            for j in 0..dims.y {
                for i in 0..dims.x {
                    let mut x = iso.node_position(i, j, k);
                    if iso.oct_rotate {
                        x = pqth_to_principal(x.x, x.y, x.z);
                    }
                    let s = callback::sample(callback_index, x);
                    if s.value.is_finite() {
                        range = Some(match range {
                            Some((lo, hi)) => (lo.min(s.value), hi.max(s.value)),
                            None => (s.value, s.value),
                        });
                    }
                    points.push(x);
                    values.push(s.value);
                    gradients.push(s.gradient);
                }
            }
        }

        Self {
            dims,
            points,
            values,
            gradients,
            field_range: range.unwrap_or((0.0, 0.0)),
        }
    }

    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn gradients(&self) -> &[DVec3] {
        &self.gradients
    }

    /// Returns the smallest and largest finite sampled value, or `(0, 0)` if none.
    pub fn field_range(&self) -> (f64, f64) {
        self.field_range
    }

    /// Returns the box spanned by the sample points, or `None` for an empty grid.
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Returns the storage index of node `(i, j, k)`.
    pub fn index(&self, i: u32, j: u32, k: u32) -> usize {
        let (nx, ny) = (self.dims.x as usize, self.dims.y as usize);
        i as usize + j as usize * nx + k as usize * nx * ny
    }

    /// Returns the points where grid edges cross `level`, linearly interpolated.
    pub fn crossings(&self, level: f64) -> Vec<DVec3> {
        let mut out = Vec::new();
        let d = self.dims;
        for k in 0..d.z {
            for j in 0..d.y {
                for i in 0..d.x {
                    let a = self.index(i, j, k);
                    let neighbours = [
                        (i + 1 < d.x).then(|| self.index(i + 1, j, k)),
                        (j + 1 < d.y).then(|| self.index(i, j + 1, k)),
                        (k + 1 < d.z).then(|| self.index(i, j, k + 1)),
                    ];
                    for b in neighbours.into_iter().flatten() {
                        let (va, vb) = (self.values[a] - level, self.values[b] - level);
                        if !(va.is_finite() && vb.is_finite()) || (va <= 0.0) == (vb <= 0.0) {
                            continue;
                        }
                        let t = va / (va - vb);
                        out.push(self.points[a].lerp(self.points[b], t));
                    }
                }
            }
        }
        out
    }
}

/// An isosurface as held by the headless renderer.
#[derive(Debug, Clone)]
pub struct IsoSurfaceModel {
    /// Index of the field function in the callback registry.
    pub callback_index: usize,
    /// Sampled grid.
    pub grid: SampledGrid,
    /// Levels drawn.
    pub levels: Vec<f64>,
    /// Lookup table, or `None` when the fixed color is used.
    pub lookup: Option<LookupTable>,
    /// Fixed color; its alpha is the opacity in both cases.
    pub color: Vec4,
    /// World-space box of the sampled region.
    pub bounds: Option<(DVec3, DVec3)>,
    pub show_wireframe: bool,
    pub show_grid_points: bool,
}

impl IsoSurfaceModel {
    /// Samples `iso` and derives its levels and colors.
    pub fn build(callback_index: usize, iso: &IsoSurface, color_maps: &ColorMapRegistry) -> Self {
        let grid = SampledGrid::sample(callback_index, iso);
        let field_range = grid.field_range();
        let levels = iso.levels(field_range);

        let spec = &iso.colormap;
        let lookup = if spec.num_colors > 0 {
            let (fmin, fmax) = match spec.range_mode {
                ColormapRangeMode::FieldRange => field_range,
                ColormapRangeMode::LevelRange => iso.level_range,
                ColormapRangeMode::Explicit => spec.range,
            };
            color_maps
                .get_or_default(&spec.name)
                .map(|map| LookupTable::build(map, spec.num_colors, fmin, fmax))
        } else {
            None
        };

        log::debug!(
            "isosurface {callback_index}: {} nodes, field range [{}, {}], {} level(s)",
            grid.values().len(),
            field_range.0,
            field_range.1,
            levels.len()
        );

        // rotated samples leave the parameter box
        let bounds = iso.bounding_box().or_else(|| grid.bounds());

        Self {
            callback_index,
            grid,
            levels,
            lookup,
            color: iso.color,
            bounds,
            show_wireframe: iso.show_wireframe,
            show_grid_points: iso.show_grid_points,
        }
    }

    /// Returns the color of the surface at `level`.
    pub fn level_color(&self, level: f64) -> Vec4 {
        match &self.lookup {
            Some(lut) => lut.color(level).extend(self.color.w),
            None => self.color,
        }
    }
}
