//! Error types
//!
//! `ModelError` covers artifact loading and inference, `PredictError` is what
//! the predict handler turns into an HTTP response.

use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or running the model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("shape mismatch: {0}")]
    Shape(String),
}

/// Errors surfaced by `POST /predict`
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("{0}")]
    BadRequest(String),

    #[error("payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Model(ModelError),
}

impl From<ModelError> for PredictError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotFound(_) => Self::ModelNotLoaded,
            ModelError::Shape(msg) => Self::Inference(msg),
            other => Self::Model(other),
        }
    }
}

impl PredictError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ModelNotLoaded => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Inference(_) | Self::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
