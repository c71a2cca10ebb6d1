//! Arrow descriptor.

use glam::{DVec3, Vec4};
use isoview_core::handle::{ArrowHandle, DrawableKind};

use crate::drawable::Drawable;

/// An arrow made of a cylinder and a tip cone.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    /// Origin of the arrow.
    pub origin: DVec3,
    /// Vector from the origin to the tip.
    pub vector: DVec3,
    /// Fraction of the length used by the tip cone.
    pub cone_pct: f64,
    /// Radius of the tip cone.
    pub cone_radius: f64,
    /// Radius of the cylinder.
    pub cylinder_radius: f64,
    /// Number of facets around the cross-section.
    pub resolution: u32,
    /// Color as (red, green, blue, opacity).
    pub color: Vec4,

    handle: Option<ArrowHandle>,
}

impl Default for Arrow {
    fn default() -> Self {
        Self {
            origin: DVec3::ZERO,
            vector: DVec3::ONE,
            cone_pct: 0.1,
            cone_radius: 0.03,
            cylinder_radius: 0.015,
            resolution: 20,
            color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            handle: None,
        }
    }
}

impl Arrow {
    /// Creates an arrow with default geometry and appearance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an arrow from `origin` along `vector`.
    pub fn from_origin(origin: DVec3, vector: DVec3) -> Self {
        Self {
            origin,
            vector,
            ..Self::default()
        }
    }

    /// Sets the color, returning self for chaining.
    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// Returns the tip position.
    pub fn tip(&self) -> DVec3 {
        self.origin + self.vector
    }

    /// Returns the point where the cylinder ends and the cone begins.
    pub fn cone_base(&self) -> DVec3 {
        self.origin + self.vector * (1.0 - self.cone_pct)
    }
}

impl Drawable for Arrow {
    type Handle = ArrowHandle;

    fn kind(&self) -> DrawableKind {
        DrawableKind::Arrow
    }

    fn handle(&self) -> Option<ArrowHandle> {
        self.handle
    }

    fn set_handle(&mut self, handle: Option<ArrowHandle>) {
        self.handle = handle;
    }

    fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let pad = DVec3::splat(self.cone_radius.max(self.cylinder_radius));
        let (a, b) = (self.origin, self.tip());
        Some((a.min(b) - pad, a.max(b) + pad))
    }
}
