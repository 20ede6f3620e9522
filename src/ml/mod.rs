//! Forecast model internals: lag-feature construction, feature scaling and
//! the per-attribute regressor bank.

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod bank;
pub mod features;
pub mod scaler;

pub use bank::*;
pub use features::*;
pub use scaler::*;

/// Held-out validation metrics, computed once per attribute at training
/// time for observability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub mse: f64,
    pub r2: f64,
}

impl ValidationMetrics {
    pub fn compute(predictions: &[f64], targets: &[f64]) -> Result<Self> {
        if predictions.len() != targets.len() {
            anyhow::bail!(
                "prediction and target count mismatch: {} predictions, {} targets",
                predictions.len(),
                targets.len()
            );
        }
        if predictions.is_empty() {
            anyhow::bail!("no predictions to evaluate");
        }

        let n = predictions.len() as f64;

        let mse: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f64>()
            / n;

        let mean_target: f64 = targets.iter().sum::<f64>() / n;
        let ss_tot: f64 = targets.iter().map(|t| (t - mean_target).powi(2)).sum();
        let ss_res: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (t - p).powi(2))
            .sum();

        let r2 = if ss_tot.abs() < 1e-10 {
            0.0
        } else {
            1.0 - (ss_res / ss_tot)
        };

        Ok(Self { mse, r2 })
    }
}

/// Round a prediction to the fixed two-decimal output precision.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_on_close_predictions() {
        let predictions = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let targets = vec![1.1, 2.1, 2.9, 4.2, 4.8];

        let metrics = ValidationMetrics::compute(&predictions, &targets).unwrap();
        assert!(metrics.mse < 0.2);
        assert!(metrics.r2 > 0.9);
    }

    #[test]
    fn test_metrics_constant_targets() {
        // Zero target variance: ss_tot degenerates, r2 pinned to 0.
        let metrics = ValidationMetrics::compute(&[5.0, 5.0], &[5.0, 5.0]).unwrap();
        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.r2, 0.0);
    }

    #[test]
    fn test_metrics_reject_mismatch() {
        assert!(ValidationMetrics::compute(&[1.0], &[1.0, 2.0]).is_err());
        assert!(ValidationMetrics::compute(&[], &[]).is_err());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(20.0049), 20.0);
        assert_eq!(round2(19.995), 20.0);
        assert_eq!(round2(-3.456), -3.46);
    }
}
