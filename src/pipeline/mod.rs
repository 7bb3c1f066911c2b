//! Prediction pipeline
//!
//! payload -> feature frame -> scaling -> model inference

pub mod frame;
pub mod scaler;

pub use frame::FeatureFrame;
pub use scaler::{ScalingStats, StandardScaler};

use ndarray::Array2;

use crate::config::ScalingMode;
use crate::error::{ModelError, PredictError};
use crate::model::{ModelArtifact, Regressor};

/// Align, scale and predict one frame
pub fn run(
    frame: &FeatureFrame,
    artifact: &ModelArtifact,
    scaling: ScalingMode,
) -> Result<Vec<f64>, PredictError> {
    let aligned;
    let frame = match artifact.feature_names.as_deref() {
        Some(names) => {
            aligned = frame.reorder(names)?;
            &aligned
        }
        None => frame,
    };

    let scaled = scale(frame.values(), artifact, scaling)?;
    Ok(artifact.estimator.predict(scaled.view())?)
}

fn scale(
    x: &Array2<f64>,
    artifact: &ModelArtifact,
    scaling: ScalingMode,
) -> Result<Array2<f64>, ModelError> {
    match scaling {
        ScalingMode::PerRequest => StandardScaler::fit_transform(x.view()),
        ScalingMode::Artifact => artifact
            .scaler
            .as_ref()
            .ok_or_else(|| {
                ModelError::Invalid("artifact has no scaler statistics".to_string())
            })?
            .transform(x.view()),
        ScalingMode::None => Ok(x.clone()),
    }
}
