//! Live weather data source.
//!
//! The service treats the upstream API as an opaque provider of
//! current-conditions and multi-day-forecast records; everything behind
//! this trait is replaceable (and is replaced, with a mock server, in
//! tests).

pub mod openweather;

pub use openweather::OpenWeatherClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{CurrentConditions, DailyForecast};

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions for a city.
    async fn current(&self, city: &str) -> Result<CurrentConditions>;

    /// Upstream multi-day forecast for a city, one entry per day.
    async fn forecast(&self, city: &str) -> Result<Vec<DailyForecast>>;
}
