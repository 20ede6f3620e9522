//! Descriptive statistics over a slice of observations.

use std::collections::BTreeMap;

use crate::domain::{AnalysisSummary, AttributeStats, DateRange, Observation, WeatherAttribute};

/// Compute the analysis summary for a set of observations, or `None` when
/// the set is empty (mean and std are undefined over an empty set).
pub fn summarize_observations(observations: &[Observation]) -> Option<AnalysisSummary> {
    let start = observations.iter().map(|o| o.date).min()?;
    let end = observations.iter().map(|o| o.date).max()?;

    let mut attributes = BTreeMap::new();
    for attr in WeatherAttribute::ALL {
        let values: Vec<f64> = observations.iter().map(|o| attr.of(o)).collect();
        attributes.insert(attr, stats(&values));
    }

    let mut weather_conditions: BTreeMap<String, usize> = BTreeMap::new();
    for description in observations.iter().filter_map(|o| o.description.as_ref()) {
        *weather_conditions.entry(description.clone()).or_default() += 1;
    }

    Some(AnalysisSummary {
        attributes,
        weather_conditions,
        data_points: observations.len(),
        date_range: DateRange { start, end },
    })
}

/// Mean/min/max plus sample standard deviation, rounded to one decimal.
/// A single-value series has no spread: std is 0.0, never NaN.
fn stats(values: &[f64]) -> AttributeStats {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let std = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };

    AttributeStats {
        mean: round1(mean),
        min: round1(min),
        max: round1(max),
        std: round1(std),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
