//! Forecast orchestration.
//!
//! Thin state machine over the regressor bank: `uninitialized` until an
//! explicit initialize call trains the bank from the stored history,
//! `trained` afterwards. Predictions reload the latest history on every
//! call; the trained models are the only state carried between calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::config::ModelConfig;
use crate::domain::{Observation, WeatherAttribute};
use crate::error::{Result, ServiceError};
use crate::ml::{RegressorBank, TrainingReport};
use crate::store::CsvStore;

pub struct ForecastService {
    cfg: ModelConfig,
    store: Arc<CsvStore>,
    /// Replaced wholesale on a successful train; readers hold the lock
    /// only long enough to score the latest feature row.
    bank: RwLock<Option<RegressorBank>>,
}

impl ForecastService {
    pub fn new(cfg: ModelConfig, store: Arc<CsvStore>) -> Self {
        Self {
            cfg,
            store,
            bank: RwLock::new(None),
        }
    }

    /// Load the full observation history, train a fresh bank and swap it
    /// in. A failed retrain leaves any previously trained bank in place.
    pub async fn initialize(&self) -> Result<TrainingReport> {
        let observations = self.load_sorted_history()?;

        let mut fresh = RegressorBank::new(self.cfg.clone());
        let report = fresh.train(&observations)?;
        info!(
            observations = observations.len(),
            attributes = report.len(),
            "forecast models trained"
        );

        *self.bank.write().await = Some(fresh);
        Ok(report)
    }

    /// Next-step prediction per attribute, 2-decimal precision.
    ///
    /// Fails with `NotInitialized` before the first successful
    /// `initialize`; otherwise reloads the latest history and returns a
    /// possibly-partial mapping (attributes without enough history are
    /// absent, not fabricated).
    pub async fn predict_next(&self) -> Result<BTreeMap<WeatherAttribute, f64>> {
        let guard = self.bank.read().await;
        let bank = guard.as_ref().ok_or(ServiceError::NotInitialized)?;

        let observations = self.load_sorted_history()?;
        Ok(bank.predict_next(&observations))
    }

    pub async fn is_trained(&self) -> bool {
        self.bank.read().await.is_some()
    }

    /// History sorted by date ascending - the feature builder's ordering
    /// precondition is discharged here, at its only production call site.
    fn load_sorted_history(&self) -> Result<Vec<Observation>> {
        let mut observations = self.store.load_history()?;
        observations.sort_by_key(|o| o.date);
        Ok(observations)
    }
}
