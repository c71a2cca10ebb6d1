//! The trait shared by all drawable descriptors.

use glam::DVec3;
use isoview_core::handle::{DrawableKind, NativeHandle};

/// A configuration record for one renderable object plus its handle slot.
///
/// The handle is `None` outside a render pass. During a pass it holds the
/// identifier the renderer returned when the drawable was registered; handles
/// are never valid across passes.
pub trait Drawable {
    /// The typed handle a renderer returns for this kind of drawable.
    type Handle: Copy + Into<NativeHandle>;

    /// Returns the kind of this drawable.
    fn kind(&self) -> DrawableKind;

    /// Returns the native handle, if the drawable is currently registered.
    fn handle(&self) -> Option<Self::Handle>;

    /// Stores or clears the native handle.
    fn set_handle(&mut self, handle: Option<Self::Handle>);

    /// Returns the axis-aligned bounding box in world coordinates.
    ///
    /// Returns `None` if the drawable has no spatial extent.
    fn bounding_box(&self) -> Option<(DVec3, DVec3)>;

    /// Returns whether the drawable is currently registered with a renderer.
    fn is_registered(&self) -> bool {
        self.handle().is_some()
    }

    /// Forgets the native handle.
    fn clear_handle(&mut self) {
        self.set_handle(None);
    }
}
