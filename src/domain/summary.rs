use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::WeatherAttribute;

/// Descriptive statistics for one numeric attribute, rounded to one
/// decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Statistical summary over a trailing window of the historical log.
///
/// Recomputed on demand; the store also writes it to a JSON artifact that
/// is overwritten on each computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub attributes: BTreeMap<WeatherAttribute, AttributeStats>,
    /// Frequency count of categorical condition descriptions.
    pub weather_conditions: BTreeMap<String, usize>,
    pub data_points: usize,
    pub date_range: DateRange,
}
