use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The weather attributes tracked across the whole pipeline.
///
/// The feature builder, the regressor bank and the historical store all
/// iterate [`WeatherAttribute::ALL`], so the tracked sets cannot drift
/// apart. Adding an attribute means adding a variant, a field on
/// [`Observation`] and an arm in [`WeatherAttribute::of`] - the compiler
/// flags anything missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherAttribute {
    Temperature,
    Humidity,
    WindSpeed,
    Precipitation,
    Pressure,
}

impl WeatherAttribute {
    pub const ALL: [WeatherAttribute; 5] = [
        WeatherAttribute::Temperature,
        WeatherAttribute::Humidity,
        WeatherAttribute::WindSpeed,
        WeatherAttribute::Precipitation,
        WeatherAttribute::Pressure,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WeatherAttribute::Temperature => "temperature",
            WeatherAttribute::Humidity => "humidity",
            WeatherAttribute::WindSpeed => "wind_speed",
            WeatherAttribute::Precipitation => "precipitation",
            WeatherAttribute::Pressure => "pressure",
        }
    }

    /// Read this attribute's value off an observation.
    pub fn of(self, obs: &Observation) -> f64 {
        match self {
            WeatherAttribute::Temperature => obs.temperature,
            WeatherAttribute::Humidity => obs.humidity,
            WeatherAttribute::WindSpeed => obs.wind_speed,
            WeatherAttribute::Precipitation => obs.precipitation,
            WeatherAttribute::Pressure => obs.pressure,
        }
    }
}

impl fmt::Display for WeatherAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One daily weather reading in the historical log.
///
/// One record per day per city is assumed unique but not enforced:
/// duplicate appends create duplicate rows by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub city: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
    pub pressure: f64,
    pub description: Option<String>,
}

/// One reading from the live weather source, logged verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    /// km/h (upstream reports m/s, converted at the source boundary).
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

impl CurrentConditions {
    /// Collapse a live reading into the daily observation appended to the
    /// historical log. The live source does not report precipitation for
    /// current conditions; the daily log records 0.0 for those rows.
    pub fn to_observation(&self) -> Observation {
        Observation {
            date: self.timestamp.date_naive(),
            city: Some(self.city.clone()),
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            precipitation: 0.0,
            pressure: self.pressure,
            description: Some(self.description.clone()),
        }
    }
}

/// One day of the upstream multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}
