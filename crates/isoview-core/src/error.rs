//! Error types for isoview.

use thiserror::Error;

/// The main error type for isoview operations.
#[derive(Error, Debug)]
pub enum IsoviewError {
    /// The renderer could not provide a resource needed to start a render pass.
    #[error("setup error: {0}")]
    Setup(String),

    /// A drawable carries parameters that cannot be rendered.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The renderer's run/display call returned a nonzero status.
    #[error("renderer run/display failed with status {0}")]
    Execution(i32),

    /// A field function failed while the renderer was sampling it.
    #[error("field evaluation failed for callback {index}: {reason}")]
    Evaluation { index: usize, reason: String },

    /// A tabular data source could not be loaded.
    #[error("cannot read data source '{path}': {reason}")]
    DataSource { path: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl IsoviewError {
    /// Returns true for errors raised by the renderer or by field evaluation
    /// after the render pass was fully set up.
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_) | Self::Evaluation { .. })
    }
}

/// A specialized Result type for isoview operations.
pub type Result<T> = std::result::Result<T, IsoviewError>;
