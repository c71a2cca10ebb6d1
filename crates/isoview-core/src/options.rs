//! Configuration options for a render pass.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A camera placed by the user instead of the default view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    /// View-up direction.
    pub up: DVec3,
    /// Point the camera looks at.
    pub focal: DVec3,
    /// Camera position.
    pub position: DVec3,
}

impl CameraView {
    pub fn new(up: DVec3, focal: DVec3, position: DVec3) -> Self {
        Self { up, focal, position }
    }
}

/// Global rendering options of a scene.
///
/// These fields are the entire configuration surface of a render pass. They
/// are handed unchanged to the renderer's window allocation and run/display
/// calls and are never modified by a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    /// Length of the x-y-z axes.
    pub axes_len: f64,

    /// Whether to show the hydrostatic line (the `x = y = z` diagonal).
    pub hydro_line: bool,

    /// Whether to reverse the direction of the default camera.
    pub reverse: bool,

    /// Whether to show both the negative and positive portions of the axes.
    pub full_axes: bool,

    /// Whether to show the transparent auxiliary planes.
    pub with_planes: bool,

    /// Whether to run in interactive mode instead of rendering once.
    pub interact: bool,

    /// Whether to save an image when the run/display call finishes.
    pub save_on_exit: bool,

    /// File name key of the saved image, without the `.png` extension.
    pub file_key: String,

    /// Window width in pixels.
    pub width: u32,

    /// Window height in pixels.
    pub height: u32,

    /// Camera zoom factor (values above 1 enlarge the scene).
    pub zoom: f64,

    /// Magnification factor applied to the saved image.
    pub png_magnification: u32,

    /// Camera to use instead of the default view. Its direction and focal
    /// point are kept; only the visible extent is fitted to the scene.
    pub camera: Option<CameraView>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            axes_len: 1.0,
            hydro_line: true,
            reverse: false,
            full_axes: true,
            with_planes: true,
            interact: true,
            save_on_exit: false,
            file_key: "tmp_isoview".to_string(),
            width: 600,
            height: 600,
            zoom: 1.0,
            png_magnification: 1,
            camera: None,
        }
    }
}

impl SceneOptions {
    /// Parses options from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the name of the image written when `save_on_exit` is set.
    pub fn output_file_name(&self) -> String {
        format!("{}.png", self.file_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IsoviewError;

    #[test]
    fn test_defaults() {
        let opts = SceneOptions::default();
        assert_eq!(opts.axes_len, 1.0);
        assert!(opts.hydro_line);
        assert!(!opts.reverse);
        assert!(opts.full_axes);
        assert!(opts.with_planes);
        assert!(opts.interact);
        assert!(!opts.save_on_exit);
        assert_eq!(opts.output_file_name(), "tmp_isoview.png");
        assert!(opts.camera.is_none());
    }

    #[test]
    fn test_camera_from_json() {
        let opts = SceneOptions::from_json_str(
            r#"{ "camera": { "up": [0, 1, 0], "focal": [0, 0, 0], "position": [0, 0, 3] } }"#,
        )
        .unwrap();
        let cam = opts.camera.unwrap();
        assert_eq!(cam.up, DVec3::Y);
        assert_eq!(cam.position, DVec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts =
            SceneOptions::from_json_str(r#"{ "interact": false, "file_key": "out" }"#).unwrap();
        assert!(!opts.interact);
        assert_eq!(opts.file_key, "out");
        assert_eq!(opts.width, 600);
        assert!(opts.hydro_line);
    }

    #[test]
    fn test_json_round_trip() {
        let opts = SceneOptions {
            reverse: true,
            zoom: 1.5,
            camera: Some(CameraView::new(DVec3::Y, DVec3::ONE, DVec3::new(1.0, 1.0, 5.0))),
            ..SceneOptions::default()
        };
        let json = opts.to_json_string().unwrap();
        assert_eq!(SceneOptions::from_json_str(&json).unwrap(), opts);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            SceneOptions::from_json_str("{ axes_len: 1 }"),
            Err(IsoviewError::JsonError(_))
        ));
        assert!(matches!(
            SceneOptions::from_json_file("/nonexistent/isoview/options.json"),
            Err(IsoviewError::IoError(_))
        ));
    }
}
