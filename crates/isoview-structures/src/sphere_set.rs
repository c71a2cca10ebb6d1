//! Sphere set descriptor (e.g. particles).

use std::io::BufRead;
use std::path::Path;

use glam::{DVec3, Vec4};
use isoview_core::error::{IsoviewError, Result};
use isoview_core::handle::{DrawableKind, SphereSetHandle};

use crate::drawable::Drawable;
use crate::table::{data_source, Table};

/// A set of spheres sharing one color.
///
/// The four coordinate/radius sequences must have the same length. This is
/// checked when the set is registered with a renderer, not when it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereSet {
    /// x coordinates.
    pub x: Vec<f64>,
    /// y coordinates.
    pub y: Vec<f64>,
    /// z coordinates.
    pub z: Vec<f64>,
    /// Radii.
    pub r: Vec<f64>,
    /// Color as (red, green, blue, opacity).
    pub color: Vec4,

    handle: Option<SphereSetHandle>,
}

impl Default for SphereSet {
    /// The eight corners of the unit cube.
    fn default() -> Self {
        Self {
            x: vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
            y: vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0],
            z: vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
            r: vec![0.1; 8],
            color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            handle: None,
        }
    }
}

impl SphereSet {
    /// Creates the default set of spheres at the unit-cube corners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from coordinate and radius sequences.
    pub fn from_columns(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, r: Vec<f64>) -> Self {
        Self {
            x,
            y,
            z,
            r,
            ..Self::default()
        }
    }

    /// Creates a set from centres and radii.
    pub fn from_spheres(spheres: impl IntoIterator<Item = (DVec3, f64)>) -> Self {
        let mut set = Self::from_columns(Vec::new(), Vec::new(), Vec::new(), Vec::new());
        for (c, r) in spheres {
            set.x.push(c.x);
            set.y.push(c.y);
            set.z.push(c.z);
            set.r.push(r);
        }
        set
    }

    /// Loads a set from a table file with columns `x`, `y`, `z` and `r`.
    ///
    /// Fails if the file cannot be read or any of the columns is missing.
    /// The color is always red.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Table::from_file(path)?;
        Self::from_table(&table, &path.display().to_string())
    }

    /// Loads a set from a table read from `reader`.
    pub fn from_reader(reader: impl BufRead, source: &str) -> Result<Self> {
        let table = Table::from_reader(reader, source)?;
        Self::from_table(&table, source)
    }

    fn from_table(table: &Table, source: &str) -> Result<Self> {
        let column = |key: &str| {
            table
                .column(key)
                .map(<[f64]>::to_vec)
                .ok_or_else(|| data_source(source, format!("missing column '{key}'")))
        };
        let set = Self::from_columns(column("x")?, column("y")?, column("z")?, column("r")?);
        log::debug!("loaded {} spheres from {source}", set.x.len());
        Ok(set)
    }

    /// Returns the number of spheres, taken from the x sequence.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if every sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty() && self.z.is_empty() && self.r.is_empty()
    }

    /// Checks that all sequences have the same length and returns it.
    ///
    /// A set whose sequences are all empty is valid and has zero spheres.
    pub fn validate(&self) -> Result<usize> {
        let n = self.x.len();
        if self.y.len() != n || self.z.len() != n || self.r.len() != n {
            return Err(IsoviewError::Configuration(format!(
                "cannot add set of spheres because x, y, z, r have different lengths ({}, {}, {}, {})",
                n,
                self.y.len(),
                self.z.len(),
                self.r.len()
            )));
        }
        Ok(n)
    }

    /// Returns the centre of sphere `i`.
    pub fn center(&self, i: usize) -> Option<DVec3> {
        Some(DVec3::new(*self.x.get(i)?, *self.y.get(i)?, *self.z.get(i)?))
    }

    /// Iterates over `(centre, radius)` pairs, stopping at the shortest sequence.
    pub fn iter(&self) -> impl Iterator<Item = (DVec3, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .zip(&self.r)
            .map(|(((&x, &y), &z), &r)| (DVec3::new(x, y, z), r))
    }
}

impl Drawable for SphereSet {
    type Handle = SphereSetHandle;

    fn kind(&self) -> DrawableKind {
        DrawableKind::SphereSet
    }

    fn handle(&self) -> Option<SphereSetHandle> {
        self.handle
    }

    fn set_handle(&mut self, handle: Option<SphereSetHandle>) {
        self.handle = handle;
    }

    fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        self.iter().fold(None, |bb, (c, r)| {
            let r = DVec3::splat(r.abs());
            let (lo, hi) = (c - r, c + r);
            Some(match bb {
                Some((min, max)) => (lo.min(min), hi.max(max)),
                None => (lo, hi),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_cube_corners() {
        let set = SphereSet::new();
        assert_eq!(set.validate().unwrap(), 8);
        assert_eq!(set.center(6), Some(DVec3::ONE));
        assert!(set.r.iter().all(|&r| r == 0.1));
        assert_eq!(set.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        let (min, max) = set.bounding_box().unwrap();
        assert!((min - DVec3::splat(-0.1)).length() < 1e-12);
        assert!((max - DVec3::splat(1.1)).length() < 1e-12);
    }

    #[test]
    fn test_mismatched_lengths() {
        let set = SphereSet::from_columns(vec![0.0, 1.0], vec![0.0], vec![0.0, 0.0], vec![0.1, 0.1]);
        assert!(matches!(
            set.validate(),
            Err(IsoviewError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_set_is_valid() {
        let set = SphereSet::from_spheres(std::iter::empty::<(DVec3, f64)>());
        assert!(set.is_empty());
        assert_eq!(set.validate().unwrap(), 0);
        assert!(set.bounding_box().is_none());
    }

    #[test]
    fn test_from_reader_any_column_order() {
        let text = "r x z y extra\n0.5 1 3 2 9\n0.25 -1 -3 -2 9\n";
        let set = SphereSet::from_reader(text.as_bytes(), "particles").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.center(0), Some(DVec3::new(1.0, 2.0, 3.0)));
        assert_eq!(set.center(1), Some(DVec3::new(-1.0, -2.0, -3.0)));
        assert_eq!(set.r, vec![0.5, 0.25]);
        assert_eq!(set.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_from_reader_missing_column() {
        let err = SphereSet::from_reader("x y z\n0 0 0\n".as_bytes(), "no-radius").unwrap_err();
        match err {
            IsoviewError::DataSource { path, reason } => {
                assert_eq!(path, "no-radius");
                assert!(reason.contains("'r'"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_from_missing_file() {
        assert!(matches!(
            SphereSet::from_file("/nonexistent/isoview/particles.dat"),
            Err(IsoviewError::DataSource { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_validate_accepts_only_equal_lengths(
            nx in 0usize..6, ny in 0usize..6, nz in 0usize..6, nr in 0usize..6
        ) {
            let set = SphereSet::from_columns(vec![0.0; nx], vec![0.0; ny], vec![0.0; nz], vec![1.0; nr]);
            let equal = nx == ny && ny == nz && nz == nr;
            prop_assert_eq!(set.validate().is_ok(), equal);
            if equal {
                prop_assert_eq!(set.validate().unwrap(), nx);
            }
        }
    }
}
