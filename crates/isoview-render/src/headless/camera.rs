//! Orthographic camera of the headless renderer.

use glam::DVec3;
use isoview_core::options::CameraView;

/// A camera looking at the scene with an orthographic projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space.
    pub position: DVec3,
    /// Point the camera is looking at.
    pub target: DVec3,
    /// Up vector.
    pub up: DVec3,
    /// Half of the visible height in world units.
    pub ortho_scale: f64,
}

impl Camera {
    /// The default view: looking at the origin from `(2c, c, c)` with `z` up,
    /// where `c` is -1 when `reverse` is set and 1 otherwise.
    pub fn default_view(reverse: bool) -> Self {
        let c = if reverse { -1.0 } else { 1.0 };
        Self {
            position: DVec3::new(2.0 * c, c, c),
            target: DVec3::ZERO,
            up: DVec3::new(0.0, 0.0, c),
            ortho_scale: 1.0,
        }
    }

    /// A camera placed at `view.position`, looking at `view.focal`.
    pub fn from_view(view: &CameraView) -> Self {
        Self {
            position: view.position,
            target: view.focal,
            up: view.up,
            ortho_scale: 1.0,
        }
    }

    /// Returns the camera's forward direction.
    pub fn forward(&self) -> DVec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(DVec3::NEG_Z)
    }

    /// Returns the camera's right direction.
    pub fn right(&self) -> DVec3 {
        let forward = self.forward();
        forward
            .cross(self.up)
            .try_normalize()
            .unwrap_or_else(|| forward.any_orthonormal_vector())
    }

    /// Returns the up direction on screen, orthogonal to forward and right.
    pub fn view_up(&self) -> DVec3 {
        self.right().cross(self.forward())
    }

    /// Moves the camera so that every point is visible, keeping the view direction.
    pub fn look_at_points(&mut self, points: &[DVec3], aspect_ratio: f64) {
        let Some(&first) = points.first() else {
            return;
        };
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let center = (min + max) * 0.5;

        let forward = self.forward();
        let distance = (self.position - self.target).length().max(1.0);
        self.target = center;
        self.position = center - forward * distance;
        self.fit_scale(points, aspect_ratio);
    }

    /// Sets the visible extent so that every point is on screen, without moving the camera.
    pub fn fit_scale(&mut self, points: &[DVec3], aspect_ratio: f64) {
        if points.is_empty() {
            return;
        }
        let (right, up) = (self.right(), self.view_up());
        let aspect_ratio = if aspect_ratio > 0.0 { aspect_ratio } else { 1.0 };
        let half_height = points
            .iter()
            .map(|&p| {
                let d = p - self.target;
                d.dot(up).abs().max(d.dot(right).abs() / aspect_ratio)
            })
            .fold(0.0_f64, f64::max);
        self.ortho_scale = (half_height * 1.1).max(1e-6);
    }

    /// Zooms in by `factor` (values below 1 zoom out).
    pub fn zoom(&mut self, factor: f64) {
        if factor > 0.0 && factor.is_finite() {
            self.ortho_scale /= factor;
        }
    }

    /// Returns the number of pixels per world unit on a viewport of `height` pixels.
    pub fn pixels_per_unit(&self, height: u32) -> f64 {
        f64::from(height) * 0.5 / self.ortho_scale
    }

    /// Projects a world point to `(pixel x, pixel y, depth)`.
    ///
    /// Pixel rows grow downwards. Smaller depth is nearer to the camera.
    pub fn project(&self, p: DVec3, width: u32, height: u32) -> DVec3 {
        let d = p - self.target;
        let scale = self.pixels_per_unit(height);
        DVec3::new(
            f64::from(width) * 0.5 + d.dot(self.right()) * scale,
            f64::from(height) * 0.5 - d.dot(self.view_up()) * scale,
            d.dot(self.forward()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let cam = Camera::default_view(false);
        assert_eq!(cam.position, DVec3::new(2.0, 1.0, 1.0));
        assert_eq!(cam.up, DVec3::Z);
        assert_eq!(cam.target, DVec3::ZERO);

        let rev = Camera::default_view(true);
        assert_eq!(rev.position, DVec3::new(-2.0, -1.0, -1.0));
        assert_eq!(rev.up, DVec3::NEG_Z);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let cam = Camera::default_view(false);
        let (f, r, u) = (cam.forward(), cam.right(), cam.view_up());
        assert!((f.length() - 1.0).abs() < 1e-12);
        assert!((r.length() - 1.0).abs() < 1e-12);
        assert!((u.length() - 1.0).abs() < 1e-12);
        assert!(f.dot(r).abs() < 1e-12 && f.dot(u).abs() < 1e-12 && r.dot(u).abs() < 1e-12);
        // z is up on screen
        assert!(u.z > 0.0);
    }

    #[test]
    fn test_target_projects_to_center() {
        let cam = Camera::default_view(false);
        let p = cam.project(DVec3::ZERO, 200, 100);
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_keeps_points_inside() {
        let mut cam = Camera::default_view(false);
        let points = [DVec3::splat(-3.0), DVec3::new(3.0, 2.0, 5.0), DVec3::X];
        cam.look_at_points(&points, 1.0);
        for p in points {
            let s = cam.project(p, 100, 100);
            assert!((0.0..=100.0).contains(&s.x), "{s}");
            assert!((0.0..=100.0).contains(&s.y), "{s}");
        }
    }

    #[test]
    fn test_user_view_keeps_focal_point() {
        let view = CameraView::new(DVec3::Y, DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 4.0));
        let mut cam = Camera::from_view(&view);
        assert_eq!(cam.forward(), DVec3::NEG_Z);
        assert!((cam.view_up() - DVec3::Y).length() < 1e-12);

        let points = [DVec3::splat(-2.0), DVec3::splat(3.0)];
        cam.fit_scale(&points, 1.0);
        assert_eq!(cam.target, view.focal);
        assert_eq!(cam.position, view.position);
        for p in points {
            let s = cam.project(p, 100, 100);
            assert!((0.0..=100.0).contains(&s.x), "{s}");
            assert!((0.0..=100.0).contains(&s.y), "{s}");
        }
        // the focal point stays in the middle of the view
        let c = cam.project(view.focal, 100, 100);
        assert!((c.x - 50.0).abs() < 1e-9 && (c.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_scales_projection() {
        let mut cam = Camera::default_view(false);
        let before = cam.pixels_per_unit(100);
        cam.zoom(2.0);
        assert!((cam.pixels_per_unit(100) - 2.0 * before).abs() < 1e-9);
        cam.zoom(0.0);
        assert!((cam.pixels_per_unit(100) - 2.0 * before).abs() < 1e-9);
    }
}
