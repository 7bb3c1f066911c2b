//! Model artifact format and inference
//!
//! The artifact is a JSON document written by the offline training job:
//!
//! ```json
//! {
//!   "estimator": {"type": "linear_regression", "coefficients": [..], "intercept": 22.5},
//!   "feature_names": ["CHAS", "RM", "TAX", "PTRATIO", "B", "LSTAT"],
//!   "scaler": {"mean": [..], "scale": [..]}
//! }
//! ```
//!
//! `feature_names` and `scaler` are optional.

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ModelError;
use crate::pipeline::ScalingStats;

/// Anything that maps a feature matrix to one prediction per row
pub trait Regressor {
    /// Number of input features the model was fitted on
    fn n_features(&self) -> usize;

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>, ModelError>;
}

/// Fitted estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    /// Ordinary least squares: `y = X . coefficients + intercept`
    LinearRegression {
        coefficients: Vec<f64>,
        #[serde(default)]
        intercept: f64,
    },
}

impl Regressor for Estimator {
    fn n_features(&self) -> usize {
        match self {
            Self::LinearRegression { coefficients, .. } => coefficients.len(),
        }
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>, ModelError> {
        if x.ncols() != self.n_features() {
            return Err(ModelError::Shape(format!(
                "X has {} features, but the model expects {}",
                x.ncols(),
                self.n_features()
            )));
        }

        match self {
            Self::LinearRegression {
                coefficients,
                intercept,
            } => {
                let coef = Array1::from(coefficients.clone());
                Ok((x.dot(&coef) + *intercept).to_vec())
            }
        }
    }
}

/// Deserialized model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub estimator: Estimator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ScalingStats>,
}

impl ModelArtifact {
    /// Feature count expected by the estimator
    pub fn n_features(&self) -> usize {
        self.estimator.n_features()
    }

    /// Read and validate an artifact file
    pub async fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ModelError::NotFound(path.to_path_buf())
            } else {
                ModelError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let artifact: Self = serde_json::from_slice(&bytes).map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let n_features = self.estimator.n_features();
        match &self.estimator {
            Estimator::LinearRegression {
                coefficients,
                intercept,
            } => {
                if coefficients.is_empty() {
                    return Err(ModelError::Invalid("estimator has no coefficients".to_string()));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ModelError::Invalid(
                        "estimator parameters must be finite".to_string(),
                    ));
                }
            }
        }

        if let Some(names) = &self.feature_names {
            if names.len() != n_features {
                return Err(ModelError::Invalid(format!(
                    "{} feature names for {n_features} coefficients",
                    names.len()
                )));
            }
            for (i, name) in names.iter().enumerate() {
                if names[..i].contains(name) {
                    return Err(ModelError::Invalid(format!("duplicate feature name '{name}'")));
                }
            }
        }

        if let Some(scaler) = &self.scaler {
            scaler.validate()?;
            if scaler.n_features() != n_features {
                return Err(ModelError::Invalid(format!(
                    "scaler has {} features, estimator has {n_features}",
                    scaler.n_features()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn linear(coefficients: Vec<f64>, intercept: f64) -> Estimator {
        Estimator::LinearRegression {
            coefficients,
            intercept,
        }
    }

    #[test]
    fn test_linear_predict() {
        let model = linear(vec![1.0, 2.0], 0.5);
        let x = array![[1.0, 1.0], [0.0, -1.0]];
        assert_eq!(model.predict(x.view()).unwrap(), vec![3.5, -1.5]);
    }

    #[test]
    fn test_predict_shape_mismatch() {
        let model = linear(vec![1.0, 2.0, 3.0], 0.0);
        let x = array![[1.0, 1.0]];
        let err = model.predict(x.view()).unwrap_err();
        assert!(err.to_string().contains("expects 3"));
    }

    #[test]
    fn test_deserialize_artifact() {
        let json = r#"{
            "estimator": {"type": "linear_regression", "coefficients": [0.1, -0.2], "intercept": 22.5},
            "feature_names": ["RM", "LSTAT"]
        }"#;
        let artifact: ModelArtifact = serde_json::from_str(json).unwrap();
        assert!(artifact.validate().is_ok());
        assert_eq!(artifact.estimator.n_features(), 2);
        assert_eq!(artifact.feature_names.as_deref().unwrap(), ["RM", "LSTAT"]);
        assert!(artifact.scaler.is_none());
    }

    #[test]
    fn test_unknown_estimator_type_rejected() {
        let json = r#"{"estimator": {"type": "random_forest", "trees": []}}"#;
        assert!(serde_json::from_str::<ModelArtifact>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_inconsistent_artifacts() {
        let empty = ModelArtifact {
            estimator: linear(vec![], 1.0),
            feature_names: None,
            scaler: None,
        };
        assert!(empty.validate().is_err());

        let names = ModelArtifact {
            estimator: linear(vec![1.0, 2.0], 0.0),
            feature_names: Some(vec!["a".to_string()]),
            scaler: None,
        };
        assert!(names.validate().is_err());

        let duplicate = ModelArtifact {
            estimator: linear(vec![1.0, 2.0], 0.0),
            feature_names: Some(vec!["a".to_string(), "a".to_string()]),
            scaler: None,
        };
        assert!(duplicate.validate().is_err());

        let scaler = ModelArtifact {
            estimator: linear(vec![1.0, 2.0], 0.0),
            feature_names: None,
            scaler: Some(ScalingStats {
                mean: vec![0.0],
                scale: vec![1.0],
            }),
        };
        assert!(scaler.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifact::load(&dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"not json").unwrap();
        let err = ModelArtifact::load(&path).await.unwrap_err();
        assert!(matches!(err, ModelError::Parse { .. }));
    }
}
