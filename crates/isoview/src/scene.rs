//! Scene composition.

use isoview_core::error::Result;
use isoview_core::options::SceneOptions;
use isoview_render::{HeadlessRenderer, Renderer};
use isoview_structures::{Arrow, Drawable, IsoSurface, Sphere, SphereSet};

use crate::pass;

/// An ordered collection of drawables plus the options of its render passes.
///
/// Drawables are appended and kept in insertion order; adding the same
/// descriptor twice draws it twice. A scene is rendered with [`Scene::run`]
/// (headless) or [`Scene::run_with`] (any renderer).
#[derive(Debug, Clone, Default)]
pub struct Scene {
    options: SceneOptions,
    pub(crate) arrows: Vec<Arrow>,
    pub(crate) spheres: Vec<Sphere>,
    pub(crate) sphere_sets: Vec<SphereSet>,
    pub(crate) isosurfaces: Vec<IsoSurface>,
}

impl Scene {
    /// Creates an empty scene with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scene with the given options.
    pub fn with_options(options: SceneOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SceneOptions {
        &mut self.options
    }

    pub fn set_options(&mut self, options: SceneOptions) {
        self.options = options;
    }

    /// Appends an arrow.
    pub fn add_arrow(&mut self, mut arrow: Arrow) {
        arrow.clear_handle();
        self.arrows.push(arrow);
    }

    /// Appends a sphere.
    pub fn add_sphere(&mut self, mut sphere: Sphere) {
        sphere.clear_handle();
        self.spheres.push(sphere);
    }

    /// Appends a set of spheres. Lengths are checked when the scene is run.
    pub fn add_sphere_set(&mut self, mut set: SphereSet) {
        set.clear_handle();
        self.sphere_sets.push(set);
    }

    /// Appends an isosurface.
    pub fn add_isosurface(&mut self, mut iso: IsoSurface) {
        iso.clear_handle();
        self.isosurfaces.push(iso);
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn sphere_sets(&self) -> &[SphereSet] {
        &self.sphere_sets
    }

    pub fn isosurfaces(&self) -> &[IsoSurface] {
        &self.isosurfaces
    }

    /// Returns the total number of drawables.
    pub fn len(&self) -> usize {
        self.arrows.len() + self.spheres.len() + self.sphere_sets.len() + self.isosurfaces.len()
    }

    /// Returns true if the scene has no drawables.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every drawable. Options are kept.
    pub fn clear(&mut self) {
        self.arrows.clear();
        self.spheres.clear();
        self.sphere_sets.clear();
        self.isosurfaces.clear();
    }

    /// Renders the scene with a [`HeadlessRenderer`] writing to the current directory.
    ///
    /// Initializes logging on first use.
    pub fn run(&mut self) -> Result<()> {
        crate::init_logging();
        let mut renderer = HeadlessRenderer::new();
        self.run_with(&mut renderer)
    }

    /// Renders the scene with `renderer`.
    ///
    /// # Errors
    ///
    /// - [`IsoviewError::Setup`](crate::IsoviewError::Setup) if the window or a drawable
    ///   cannot be allocated, or if called from inside a field function
    /// - [`IsoviewError::Configuration`](crate::IsoviewError::Configuration) for a sphere
    ///   set with sequences of different lengths or an isosurface with fewer than two
    ///   divisions along an axis
    /// - [`IsoviewError::Execution`](crate::IsoviewError::Execution) if the renderer
    ///   returns a nonzero status
    /// - [`IsoviewError::Evaluation`](crate::IsoviewError::Evaluation) if a field
    ///   function panicked while the renderer sampled it
    pub fn run_with<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<()> {
        log::debug!(
            "running scene with {} drawable(s), interact = {}",
            self.len(),
            self.options.interact
        );
        pass::run(self, renderer)
    }

    pub(crate) fn clear_handles(&mut self) {
        self.arrows.iter_mut().for_each(Drawable::clear_handle);
        self.spheres.iter_mut().for_each(Drawable::clear_handle);
        self.sphere_sets.iter_mut().for_each(Drawable::clear_handle);
        self.isosurfaces.iter_mut().for_each(Drawable::clear_handle);
    }
}

/// Adding a descriptor to a scene.
pub trait Attach {
    /// Appends a copy of this descriptor to `scene`.
    ///
    /// The copy shares the field function of an isosurface.
    fn attach_to(&self, scene: &mut Scene) -> Result<()>;
}

impl Attach for Arrow {
    fn attach_to(&self, scene: &mut Scene) -> Result<()> {
        scene.add_arrow(self.clone());
        Ok(())
    }
}

impl Attach for Sphere {
    fn attach_to(&self, scene: &mut Scene) -> Result<()> {
        scene.add_sphere(self.clone());
        Ok(())
    }
}

impl Attach for SphereSet {
    fn attach_to(&self, scene: &mut Scene) -> Result<()> {
        scene.add_sphere_set(self.clone());
        Ok(())
    }
}

impl Attach for IsoSurface {
    fn attach_to(&self, scene: &mut Scene) -> Result<()> {
        scene.add_isosurface(self.clone());
        Ok(())
    }
}
