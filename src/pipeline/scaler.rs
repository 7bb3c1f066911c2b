//! Standard scaler
//!
//! Zero-mean / unit-variance standardization with explicit statistics, so the
//! caller decides whether they come from the request itself or from training.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Per-column standardization statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingStats {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Fits `ScalingStats` on a matrix
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardScaler;

impl StandardScaler {
    /// Column means and population standard deviations (ddof = 0).
    ///
    /// A zero deviation is stored as 1.0, so a constant column, and every column
    /// of a single-row matrix, transforms to 0.0.
    pub fn fit(x: ArrayView2<'_, f64>) -> Result<ScalingStats, ModelError> {
        if x.nrows() == 0 {
            return Err(ModelError::Shape("cannot fit scaler on zero rows".to_string()));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| ModelError::Shape("cannot fit scaler on zero rows".to_string()))?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 || !s.is_finite() { 1.0 } else { s });

        Ok(ScalingStats {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        })
    }

    /// Fit on `x` and transform `x` with the fitted statistics
    pub fn fit_transform(x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        Self::fit(x)?.transform(x)
    }
}

impl ScalingStats {
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.mean.len() != self.scale.len() {
            return Err(ModelError::Invalid(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ModelError::Invalid(
                "scaler scales must be finite and non-zero".to_string(),
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(ModelError::Invalid("scaler means must be finite".to_string()));
        }
        Ok(())
    }

    /// `(x - mean) / scale`, column-wise
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        if x.ncols() != self.n_features() {
            return Err(ModelError::Shape(format!(
                "scaler fitted on {} features, got {}",
                self.n_features(),
                x.ncols()
            )));
        }

        let mean = Array1::from(self.mean.clone());
        let scale = Array1::from(self.scale.clone());
        Ok((&x - &mean) / &scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fit_population_std() {
        let x = array![[1.0, 10.0], [3.0, 10.0]];
        let stats = StandardScaler::fit(x.view()).unwrap();
        assert_eq!(stats.mean, vec![2.0, 10.0]);
        // constant column gets scale 1.0
        assert_eq!(stats.scale, vec![1.0, 1.0]);

        let x = array![[0.0], [2.0], [4.0], [6.0]];
        let stats = StandardScaler::fit(x.view()).unwrap();
        assert!(approx(stats.scale[0], 5.0_f64.sqrt()));
    }

    #[test]
    fn test_transform_zero_mean_unit_variance() {
        let x = array![[1.0, 100.0], [2.0, 200.0], [3.0, 600.0]];
        let scaled = StandardScaler::fit_transform(x.view()).unwrap();
        assert_eq!(scaled.dim(), (3, 2));
        for col in scaled.columns() {
            assert!(approx(col.mean().unwrap(), 0.0));
            assert!(approx(col.std(0.0), 1.0));
        }
    }

    #[test]
    fn test_single_row_degenerates_to_zeros() {
        let x = array![[0.0, 6.575, 296.0, 15.3, 396.9, 4.98]];
        let scaled = StandardScaler::fit_transform(x.view()).unwrap();
        assert_eq!(scaled.dim(), (1, 6));
        assert!(scaled.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_transform_with_training_stats() {
        let stats = ScalingStats {
            mean: vec![1.0, 2.0],
            scale: vec![2.0, 4.0],
        };
        let x = array![[3.0, 10.0]];
        let scaled = stats.transform(x.view()).unwrap();
        assert_eq!(scaled, array![[1.0, 2.0]]);
    }

    #[test]
    fn test_transform_shape_mismatch() {
        let stats = ScalingStats {
            mean: vec![0.0],
            scale: vec![1.0],
        };
        let x = array![[1.0, 2.0]];
        assert!(matches!(stats.transform(x.view()), Err(ModelError::Shape(_))));
    }

    #[test]
    fn test_validate() {
        let ok = ScalingStats {
            mean: vec![0.0, 1.0],
            scale: vec![1.0, 2.0],
        };
        assert!(ok.validate().is_ok());

        let uneven = ScalingStats {
            mean: vec![0.0],
            scale: vec![1.0, 2.0],
        };
        assert!(uneven.validate().is_err());

        let zero = ScalingStats {
            mean: vec![0.0],
            scale: vec![0.0],
        };
        assert!(zero.validate().is_err());
    }
}
