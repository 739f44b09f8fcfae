//! Error types for the filter engine.

use crate::transforms::TransformKind;

/// Result alias that carries [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Every failure the engine can report. All of them are local to a single
/// unit of work (one render, one preview, one catalog load).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Pixel buffer does not describe an addressable RGBA8 image.
    #[error("malformed image: {0}")]
    MalformedImage(String),

    /// Transform parameters rejected at catalog construction.
    #[error("invalid {kind} parameters: {reason}")]
    InvalidParameters { kind: TransformKind, reason: String },

    /// A stage could not produce a usable output.
    #[error("{kind} failed: {reason}")]
    TransformFailed { kind: TransformKind, reason: String },

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    /// The render was superseded before it finished.
    #[error("render cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl EngineError {
    pub(crate) fn invalid_params(kind: TransformKind, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn transform_failed(kind: TransformKind, reason: impl Into<String>) -> Self {
        Self::TransformFailed {
            kind,
            reason: reason.into(),
        }
    }
}
