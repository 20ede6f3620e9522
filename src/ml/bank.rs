//! Per-attribute regressor bank.
//!
//! One random forest and one fitted scaler per tracked weather attribute,
//! trained independently over the shared lag-feature matrix. The bank is
//! replaced wholesale on retrain; it never mutates a trained entry in
//! place.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::domain::{Observation, WeatherAttribute};
use crate::error::ServiceError;

use super::{build_lag_features, round2, target_series, StandardScaler, ValidationMetrics};

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// A fitted scaler + forest for one attribute. Immutable once stored.
pub struct AttributeModel {
    scaler: StandardScaler,
    forest: Forest,
}

/// Per-attribute training outcome, returned from `train` for observability.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeReport {
    pub training_rows: usize,
    pub holdout_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ValidationMetrics>,
}

pub type TrainingReport = BTreeMap<WeatherAttribute, AttributeReport>;

pub struct RegressorBank {
    cfg: ModelConfig,
    models: BTreeMap<WeatherAttribute, AttributeModel>,
}

impl RegressorBank {
    pub fn new(cfg: ModelConfig) -> Self {
        Self {
            cfg,
            models: BTreeMap::new(),
        }
    }

    pub fn is_trained(&self) -> bool {
        !self.models.is_empty()
    }

    pub fn trained_attributes(&self) -> Vec<WeatherAttribute> {
        self.models.keys().copied().collect()
    }

    /// Train one model per tracked attribute.
    ///
    /// Precondition: `observations` sorted by date ascending. Attributes
    /// whose fit fails are skipped with a warning; the call errors only
    /// when no attribute could be trained at all.
    pub fn train(&mut self, observations: &[Observation]) -> Result<TrainingReport, ServiceError> {
        let lags = self.cfg.lag_days;
        let features = build_lag_features(observations, lags);
        if features.is_empty() {
            return Err(ServiceError::DataUnavailable(format!(
                "need at least {} observations to build lag features, got {}",
                lags + 1,
                observations.len()
            )));
        }

        let (train_idx, test_idx) = self.split_indices(features.len());
        let train_rows: Vec<Vec<f64>> =
            train_idx.iter().map(|&i| features.rows[i].clone()).collect();
        let test_rows: Vec<Vec<f64>> =
            test_idx.iter().map(|&i| features.rows[i].clone()).collect();

        let mut report = TrainingReport::new();
        let mut models = BTreeMap::new();

        for attr in WeatherAttribute::ALL {
            let targets = target_series(observations, attr, lags);
            let train_targets: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();
            let test_targets: Vec<f64> = test_idx.iter().map(|&i| targets[i]).collect();

            match self.fit_attribute(&train_rows, &train_targets, &test_rows, &test_targets) {
                Ok((model, metrics)) => {
                    if let Some(m) = &metrics {
                        info!(%attr, mse = m.mse, r2 = m.r2, "trained attribute model");
                    } else {
                        info!(%attr, rows = train_rows.len(), "trained attribute model (no holdout)");
                    }
                    report.insert(
                        attr,
                        AttributeReport {
                            training_rows: train_rows.len(),
                            holdout_rows: test_rows.len(),
                            metrics,
                        },
                    );
                    models.insert(attr, model);
                }
                Err(e) => {
                    warn!(%attr, error = %e, "skipping attribute, training failed");
                }
            }
        }

        if models.is_empty() {
            return Err(ServiceError::DataUnavailable(
                "no attribute could be trained".to_string(),
            ));
        }

        self.models = models;
        Ok(report)
    }

    /// Predict the next value for every attribute with a stored model.
    ///
    /// Builds features from the full input and scores the most recent
    /// feature row. Attributes without a model, or an input too short to
    /// produce a feature row, are simply absent from the result - partial
    /// predictions are preferred over all-or-nothing failure.
    pub fn predict_next(&self, observations: &[Observation]) -> BTreeMap<WeatherAttribute, f64> {
        let features = build_lag_features(observations, self.cfg.lag_days);
        let Some(latest) = features.rows.last() else {
            return BTreeMap::new();
        };

        let mut predictions = BTreeMap::new();
        for (attr, model) in &self.models {
            match Self::score(model, latest) {
                Ok(value) => {
                    predictions.insert(*attr, round2(value));
                }
                Err(e) => {
                    warn!(%attr, error = %e, "skipping attribute, prediction failed");
                }
            }
        }
        predictions
    }

    fn score(model: &AttributeModel, row: &[f64]) -> Result<f64> {
        let scaled = model.scaler.transform(row)?;
        let x = DenseMatrix::new(1, scaled.len(), scaled, false);
        let predicted = model
            .forest
            .predict(&x)
            .map_err(|e| anyhow!("prediction failed: {:?}", e))?;
        predicted
            .first()
            .copied()
            .ok_or_else(|| anyhow!("model returned no predictions"))
    }

    fn fit_attribute(
        &self,
        train_rows: &[Vec<f64>],
        train_targets: &[f64],
        test_rows: &[Vec<f64>],
        test_targets: &[f64],
    ) -> Result<(AttributeModel, Option<ValidationMetrics>)> {
        // Scaler parameters come from the training partition only.
        let scaler = StandardScaler::fit(train_rows)?;
        let scaled_train = scaler.transform_all(train_rows)?;

        let x = to_matrix(&scaled_train);
        let y = train_targets.to_vec();

        let params = RandomForestRegressorParameters {
            max_depth: self.cfg.max_depth,
            min_samples_leaf: 1,
            min_samples_split: 2,
            n_trees: self.cfg.n_trees,
            m: None,
            keep_samples: false,
            seed: self.cfg.seed,
        };

        let forest = RandomForestRegressor::fit(&x, &y, params)
            .map_err(|e| anyhow!("random forest training failed: {:?}", e))?;

        let metrics = if test_rows.is_empty() {
            None
        } else {
            let scaled_test = scaler.transform_all(test_rows)?;
            let x_test = to_matrix(&scaled_test);
            let predicted = forest
                .predict(&x_test)
                .map_err(|e| anyhow!("holdout prediction failed: {:?}", e))?;
            Some(ValidationMetrics::compute(&predicted, test_targets)?)
        };

        Ok((AttributeModel { scaler, forest }, metrics))
    }

    /// Deterministic shuffled 80/20 split over row indices. At least one
    /// row always lands in the training partition; the holdout may be
    /// empty for tiny inputs.
    fn split_indices(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.cfg.seed);
        indices.shuffle(&mut rng);

        let split = ((n as f64) * self.cfg.train_ratio).floor() as usize;
        let split = split.clamp(1, n);
        let test = indices.split_off(split);
        (indices, test)
    }
}

fn to_matrix(rows: &[Vec<f64>]) -> DenseMatrix<f64> {
    let n_samples = rows.len();
    let n_features = rows.first().map(Vec::len).unwrap_or(0);
    let mut flat = Vec::with_capacity(n_samples * n_features);
    for row in rows {
        flat.extend_from_slice(row);
    }
    DenseMatrix::new(n_samples, n_features, flat, false)
}
