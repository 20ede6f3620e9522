//! Lag-feature construction for next-day forecasting.
//!
//! Turns a date-ordered run of daily observations into supervised-learning
//! rows: for each day with `lags` complete predecessors, the feature row
//! holds every tracked attribute at lag 1..=lags, and the target is that
//! day's value of the attribute being modelled.

use crate::domain::{Observation, WeatherAttribute};

/// Shared lag-feature matrix for a series of observations.
///
/// The same matrix feeds every attribute's regressor; only the target
/// series differs per attribute.
#[derive(Debug, Clone)]
pub struct LagFeatures {
    /// `attr_lag_n` names, lag-major: all attributes at lag 1, then all at
    /// lag 2, and so on.
    pub names: Vec<String>,
    /// One row per observation index `lags..n`.
    pub rows: Vec<Vec<f64>>,
}

impl LagFeatures {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

pub fn lag_feature_names(lags: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(WeatherAttribute::ALL.len() * lags);
    for lag in 1..=lags {
        for attr in WeatherAttribute::ALL {
            names.push(format!("{}_lag_{}", attr, lag));
        }
    }
    names
}

/// Build the lag-feature matrix for `observations`.
///
/// Precondition: `observations` sorted by date ascending. The builder does
/// not sort; ordering is the caller's responsibility.
///
/// Fewer than `lags + 1` observations yields an empty matrix - the first
/// `lags` rows of any series lack complete predecessors and are dropped.
pub fn build_lag_features(observations: &[Observation], lags: usize) -> LagFeatures {
    let names = lag_feature_names(lags);
    let n = observations.len();
    if n <= lags {
        return LagFeatures {
            names,
            rows: Vec::new(),
        };
    }

    let mut rows = Vec::with_capacity(n - lags);
    for i in lags..n {
        let mut row = Vec::with_capacity(names.len());
        for lag in 1..=lags {
            for attr in WeatherAttribute::ALL {
                row.push(attr.of(&observations[i - lag]));
            }
        }
        rows.push(row);
    }

    LagFeatures { names, rows }
}

/// The target vector aligned with [`build_lag_features`]: `attr`'s value on
/// each day that has a complete feature row.
pub fn target_series(observations: &[Observation], attr: WeatherAttribute, lags: usize) -> Vec<f64> {
    if observations.len() <= lags {
        return Vec::new();
    }
    observations[lags..].iter().map(|o| attr.of(o)).collect()
}
