//! Software rasterization into a depth-buffered canvas.
//!
//! All drawing calls take screen-space points `(pixel x, pixel y, depth)` as
//! produced by [`super::camera::Camera::project`]. Opaque fragments write the
//! depth buffer; translucent fragments are blended but leave it untouched, so
//! they should be drawn after all opaque geometry.

use glam::{DVec3, Vec3, Vec4};

/// An RGB color buffer with a depth buffer.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    color: Vec<Vec3>,
    depth: Vec<f64>,
}

impl Canvas {
    /// Creates a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: Vec3) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![background; n],
            depth: vec![f64::INFINITY; n],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the color of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec3> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.color[y as usize * self.width as usize + x as usize])
    }

    fn blend(&mut self, x: i64, y: i64, z: f64, color: Vec4) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        if z >= self.depth[idx] || color.w <= 0.0 {
            return;
        }
        let alpha = color.w.min(1.0);
        self.color[idx] = color.truncate() * alpha + self.color[idx] * (1.0 - alpha);
        if alpha >= 1.0 {
            self.depth[idx] = z;
        }
    }

    fn clipped_box(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> (i64, i64, i64, i64) {
        let x0 = (min_x.floor() as i64).max(0);
        let y0 = (min_y.floor() as i64).max(0);
        let x1 = (max_x.ceil() as i64).min(i64::from(self.width) - 1);
        let y1 = (max_y.ceil() as i64).min(i64::from(self.height) - 1);
        (x0, y0, x1, y1)
    }

    /// Draws a flat disc of `radius` pixels.
    pub fn point(&mut self, center: DVec3, radius: f64, color: Vec4) {
        let r = radius.max(0.5);
        let (x0, y0, x1, y1) =
            self.clipped_box(center.x - r, center.y - r, center.x + r, center.y + r);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= r * r {
                    self.blend(x, y, center.z, color);
                }
            }
        }
    }

    /// Draws a shaded sphere of `radius` pixels.
    ///
    /// `depth_scale` converts pixels back to depth units.
    pub fn ball(&mut self, center: DVec3, radius: f64, depth_scale: f64, color: Vec4) {
        let r = radius.max(0.5);
        let (x0, y0, x1, y1) =
            self.clipped_box(center.x - r, center.y - r, center.x + r, center.y + r);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                let d2 = dx * dx + dy * dy;
                if d2 > r * r {
                    continue;
                }
                let dz = (r * r - d2).sqrt();
                // light from the upper left, towards the scene
                let normal = DVec3::new(dx, -dy, dz) / r;
                let light = DVec3::new(-0.4, 0.5, 0.77).normalize();
                let shade = (0.35 + 0.65 * normal.dot(light).max(0.0)) as f32;
                let rgb = color.truncate() * shade;
                self.blend(x, y, center.z - dz * depth_scale, rgb.extend(color.w));
            }
        }
    }

    /// Draws a line segment `width` pixels wide.
    pub fn line(&mut self, a: DVec3, b: DVec3, width: f64, color: Vec4) {
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0);
        let n = steps as i64;
        for s in 0..=n {
            let p = a.lerp(b, s as f64 / steps);
            if width <= 1.5 {
                self.blend(p.x.floor() as i64, p.y.floor() as i64, p.z, color);
            } else {
                self.point(p, width * 0.5, color);
            }
        }
    }

    /// Fills a triangle, interpolating depth.
    pub fn triangle(&mut self, a: DVec3, b: DVec3, c: DVec3, color: Vec4) {
        let edge = |p: DVec3, q: DVec3, x: f64, y: f64| (q.x - p.x) * (y - p.y) - (q.y - p.y) * (x - p.x);
        let area = edge(a, b, c.x, c.y);
        if area.abs() < 1e-12 {
            return;
        }
        let (x0, y0, x1, y1) = self.clipped_box(
            a.x.min(b.x).min(c.x),
            a.y.min(b.y).min(c.y),
            a.x.max(b.x).max(c.x),
            a.y.max(b.y).max(c.y),
        );
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let w0 = edge(b, c, px, py) / area;
                let w1 = edge(c, a, px, py) / area;
                let w2 = edge(a, b, px, py) / area;
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let z = w0 * a.z + w1 * b.z + w2 * c.z;
                    self.blend(x, y, z, color);
                }
            }
        }
    }

    /// Returns the pixels as 8-bit RGBA, rows top to bottom.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.color.len() * 4);
        for c in &self.color {
            let c = (c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
            data.extend_from_slice(&[c.x as u8, c.y as u8, c.z as u8, 255]);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
    const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

    #[test]
    fn test_background() {
        let canvas = Canvas::new(4, 3, Vec3::ONE);
        assert_eq!(canvas.pixel(3, 2), Some(Vec3::ONE));
        assert_eq!(canvas.pixel(4, 0), None);
        assert_eq!(canvas.to_rgba8().len(), 4 * 3 * 4);
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut canvas = Canvas::new(10, 10, Vec3::ONE);
        canvas.point(DVec3::new(5.0, 5.0, 1.0), 2.0, RED);
        canvas.point(DVec3::new(5.0, 5.0, 2.0), 2.0, BLUE);
        assert_eq!(canvas.pixel(5, 5), Some(Vec3::X));
        canvas.point(DVec3::new(5.0, 5.0, 0.5), 2.0, BLUE);
        assert_eq!(canvas.pixel(5, 5), Some(Vec3::Z));
    }

    #[test]
    fn test_translucent_blend() {
        let mut canvas = Canvas::new(4, 4, Vec3::ONE);
        canvas.point(DVec3::new(2.0, 2.0, 0.0), 1.0, Vec4::new(0.0, 0.0, 0.0, 0.5));
        let c = canvas.pixel(2, 2).unwrap();
        assert!((c - Vec3::splat(0.5)).length() < 1e-6);
        // translucent fragments do not occlude
        canvas.point(DVec3::new(2.0, 2.0, 1.0), 1.0, RED);
        assert_eq!(canvas.pixel(2, 2), Some(Vec3::X));
    }

    #[test]
    fn test_triangle_and_line_cover_pixels() {
        let mut canvas = Canvas::new(20, 20, Vec3::ONE);
        canvas.triangle(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(20.0, 0.0, 0.0),
            DVec3::new(0.0, 20.0, 0.0),
            RED,
        );
        assert_eq!(canvas.pixel(2, 2), Some(Vec3::X));
        assert_eq!(canvas.pixel(18, 18), Some(Vec3::ONE));

        canvas.line(DVec3::new(0.0, 19.5, -1.0), DVec3::new(19.9, 19.5, -1.0), 1.0, BLUE);
        assert_eq!(canvas.pixel(10, 19), Some(Vec3::Z));
    }

    #[test]
    fn test_drawing_off_canvas_is_clipped() {
        let mut canvas = Canvas::new(5, 5, Vec3::ONE);
        canvas.point(DVec3::new(-50.0, -50.0, 0.0), 3.0, RED);
        canvas.ball(DVec3::new(100.0, 2.0, 0.0), 3.0, 1.0, RED);
        canvas.line(DVec3::new(-10.0, -10.0, 0.0), DVec3::new(-1.0, -1.0, 0.0), 3.0, RED);
        assert!(canvas.to_rgba8().chunks(4).all(|p| p == [255, 255, 255, 255]));
    }
}
