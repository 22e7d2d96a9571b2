use crate::model_service::ModelService;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RegressionError {
    #[error("Need at least two samples to fit, got {0}")]
    NotEnoughSamples(usize),
    #[error("Inputs and targets differ in length: {inputs} vs {targets}")]
    LengthMismatch { inputs: usize, targets: usize },
    #[error("All inputs are identical, slope is undefined")]
    ZeroVariance,
}

/// Single-feature ordinary least squares: `y = coefficient * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub coefficient: f64,
    pub intercept: f64,
}

impl LinearRegression {
    pub fn fit(inputs: &[f64], targets: &[f64]) -> Result<Self, RegressionError> {
        if inputs.len() != targets.len() {
            return Err(RegressionError::LengthMismatch {
                inputs: inputs.len(),
                targets: targets.len(),
            });
        }
        if inputs.len() < 2 {
            return Err(RegressionError::NotEnoughSamples(inputs.len()));
        }

        let n = inputs.len() as f64;
        let mean_x = inputs.iter().sum::<f64>() / n;
        let mean_y = targets.iter().sum::<f64>() / n;

        let (covariance, variance) = inputs.iter().zip(targets).fold(
            (0.0, 0.0),
            |(cov, var), (x, y)| {
                let dx = x - mean_x;
                (cov + dx * (y - mean_y), var + dx * dx)
            },
        );

        if variance == 0.0 {
            return Err(RegressionError::ZeroVariance);
        }

        let coefficient = covariance / variance;
        Ok(Self {
            coefficient,
            intercept: mean_y - coefficient * mean_x,
        })
    }

    pub fn evaluate(&self, inputs: &[f64], targets: &[f64]) -> Metrics {
        let predictions: Vec<f64> = inputs.iter().map(|x| self.predict(*x)).collect();
        Metrics::compute(targets, &predictions)
    }
}

impl ModelService for LinearRegression {
    fn predict(&self, weight_in_kg: f64) -> f64 {
        self.coefficient * weight_in_kg + self.intercept
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mse: f64,
    pub r2: Option<f64>,
}

impl Metrics {
    /// Mean squared error and coefficient of determination.
    ///
    /// R² is `None` when the targets have no variance.
    pub fn compute(targets: &[f64], predictions: &[f64]) -> Self {
        let n = targets.len() as f64;
        let residual: f64 = targets
            .iter()
            .zip(predictions)
            .map(|(y, p)| (y - p).powi(2))
            .sum();
        let mean = targets.iter().sum::<f64>() / n;
        let total: f64 = targets.iter().map(|y| (y - mean).powi(2)).sum();

        Self {
            mse: residual / n,
            r2: (total != 0.0).then(|| 1.0 - residual / total),
        }
    }
}
