//! Typed native handles.
//!
//! A renderer hands back one opaque identifier per allocated resource. Each
//! drawable kind gets its own handle type so that an arrow handle can never be
//! stored on a sphere, and [`NativeHandle`] tags them for the release stack.

use std::fmt;
use std::num::NonZeroU64;

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Wraps a raw renderer identifier. Zero is the null handle and yields `None`.
            pub fn from_raw(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            /// Returns the raw renderer identifier.
            pub fn raw(self) -> u64 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

native_handle!(
    /// Handle to a renderer window (scene context).
    WindowHandle
);
native_handle!(
    /// Handle to an arrow registered with a renderer.
    ArrowHandle
);
native_handle!(
    /// Handle to a single sphere registered with a renderer.
    SphereHandle
);
native_handle!(
    /// Handle to a set of spheres registered with a renderer.
    SphereSetHandle
);
native_handle!(
    /// Handle to an isosurface registered with a renderer.
    IsoSurfaceHandle
);

/// Kind of resource a [`NativeHandle`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawableKind {
    Window,
    Arrow,
    Sphere,
    SphereSet,
    IsoSurface,
}

impl fmt::Display for DrawableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Window => "window",
            Self::Arrow => "arrow",
            Self::Sphere => "sphere",
            Self::SphereSet => "sphere set",
            Self::IsoSurface => "isosurface",
        };
        f.write_str(name)
    }
}

/// Any handle a renderer can release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeHandle {
    Window(WindowHandle),
    Arrow(ArrowHandle),
    Sphere(SphereHandle),
    SphereSet(SphereSetHandle),
    IsoSurface(IsoSurfaceHandle),
}

impl NativeHandle {
    /// Returns the kind of resource this handle refers to.
    pub fn kind(self) -> DrawableKind {
        match self {
            Self::Window(_) => DrawableKind::Window,
            Self::Arrow(_) => DrawableKind::Arrow,
            Self::Sphere(_) => DrawableKind::Sphere,
            Self::SphereSet(_) => DrawableKind::SphereSet,
            Self::IsoSurface(_) => DrawableKind::IsoSurface,
        }
    }

    /// Returns the raw renderer identifier.
    pub fn raw(self) -> u64 {
        match self {
            Self::Window(h) => h.raw(),
            Self::Arrow(h) => h.raw(),
            Self::Sphere(h) => h.raw(),
            Self::SphereSet(h) => h.raw(),
            Self::IsoSurface(h) => h.raw(),
        }
    }
}

impl From<WindowHandle> for NativeHandle {
    fn from(h: WindowHandle) -> Self {
        Self::Window(h)
    }
}

impl From<ArrowHandle> for NativeHandle {
    fn from(h: ArrowHandle) -> Self {
        Self::Arrow(h)
    }
}

impl From<SphereHandle> for NativeHandle {
    fn from(h: SphereHandle) -> Self {
        Self::Sphere(h)
    }
}

impl From<SphereSetHandle> for NativeHandle {
    fn from(h: SphereSetHandle) -> Self {
        Self::SphereSet(h)
    }
}

impl From<IsoSurfaceHandle> for NativeHandle {
    fn from(h: IsoSurfaceHandle) -> Self {
        Self::IsoSurface(h)
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind(), self.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle_is_rejected() {
        assert!(WindowHandle::from_raw(0).is_none());
        assert_eq!(ArrowHandle::from_raw(7).map(ArrowHandle::raw), Some(7));
    }

    #[test]
    fn test_native_handle_kind() {
        let h: NativeHandle = SphereSetHandle::from_raw(3).unwrap().into();
        assert_eq!(h.kind(), DrawableKind::SphereSet);
        assert_eq!(h.raw(), 3);
        assert_eq!(h.to_string(), "sphere set #3");
    }
}
