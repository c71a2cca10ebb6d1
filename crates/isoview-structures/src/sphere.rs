//! Single sphere descriptor.

use glam::{DVec3, Vec4};
use isoview_core::handle::{DrawableKind, SphereHandle};

use crate::drawable::Drawable;

/// A single sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    /// Centre coordinates.
    pub center: DVec3,
    /// Radius.
    pub radius: f64,
    /// Color as (red, green, blue, opacity).
    pub color: Vec4,

    handle: Option<SphereHandle>,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            radius: 1.0,
            color: Vec4::new(0.0, 1.0, 1.0, 1.0),
            handle: None,
        }
    }
}

impl Sphere {
    /// Creates a unit sphere at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sphere at `center` with the given radius.
    pub fn at(center: DVec3, radius: f64) -> Self {
        Self {
            center,
            radius,
            ..Self::default()
        }
    }

    /// Sets the color, returning self for chaining.
    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }
}

impl Drawable for Sphere {
    type Handle = SphereHandle;

    fn kind(&self) -> DrawableKind {
        DrawableKind::Sphere
    }

    fn handle(&self) -> Option<SphereHandle> {
        self.handle
    }

    fn set_handle(&mut self, handle: Option<SphereHandle>) {
        self.handle = handle;
    }

    fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let r = DVec3::splat(self.radius.abs());
        Some((self.center - r, self.center + r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_defaults() {
        let sphere = Sphere::new();
        assert_eq!(sphere.center, DVec3::ZERO);
        assert_eq!(sphere.radius, 1.0);
        assert_eq!(sphere.color, Vec4::new(0.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn test_sphere_bounds() {
        let sphere = Sphere::at(DVec3::new(1.0, 2.0, 3.0), 0.5);
        let (min, max) = sphere.bounding_box().unwrap();
        assert_eq!(min, DVec3::new(0.5, 1.5, 2.5));
        assert_eq!(max, DVec3::new(1.5, 2.5, 3.5));
    }
}
