//! Standardizing feature scaler.
//!
//! Fitted on the training partition only, then applied to held-out rows and
//! inference rows with the frozen parameters.

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit per-column mean and standard deviation on `rows`.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            anyhow::bail!("cannot fit scaler on empty data");
        }
        let n_features = rows[0].len();
        if rows.iter().any(|r| r.len() != n_features) {
            anyhow::bail!("all rows must have the same length");
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; n_features];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = vec![0.0; n_features];
        for row in rows {
            for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
                *s += (v - m).powi(2);
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
        }

        Ok(Self { means, stds })
    }

    /// Z-score one row with the fitted parameters. Columns with degenerate
    /// variance map to 0.0 instead of dividing by zero.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.means.len() {
            anyhow::bail!(
                "feature count mismatch: expected {}, got {}",
                self.means.len(),
                row.len()
            );
        }

        Ok(row
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(v, (mean, std))| {
                if std.abs() < 1e-10 {
                    0.0
                } else {
                    (v - mean) / std
                }
            })
            .collect())
    }

    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}
