//! OpenWeather-compatible API client.
//!
//! Fetches current conditions and the 5-day/3-hour forecast in metric
//! units, collapsing forecast entries to one per calendar day (the last
//! entry for a day wins).

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::config::SourceConfig;
use crate::domain::{CurrentConditions, DailyForecast};

use super::WeatherSource;

#[derive(Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(cfg: &SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("weathervane/0.1"));
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_seconds))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, endpoint: &str, city: &str) -> Result<T> {
        if self.api_key.is_empty() {
            anyhow::bail!("weather API key is not configured");
        }

        let url = format!(
            "{}/{}?q={}&appid={}&units=metric",
            self.base_url, endpoint, city, self.api_key
        );
        debug!(endpoint, city, "fetching from weather API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("weather API request failed")?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            anyhow::bail!("weather API rejected the configured API key");
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("weather API error: HTTP {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .context("failed to parse weather API response")
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<CurrentConditions> {
        let raw: RawCurrent = self.fetch("weather", city).await?;
        let weather = raw.weather.into_iter().next().unwrap_or_default();

        Ok(CurrentConditions {
            timestamp: DateTime::from_timestamp(raw.dt, 0)
                .context("weather API returned an invalid timestamp")?,
            city: raw.name,
            country: raw.sys.and_then(|s| s.country),
            temperature: round1(raw.main.temp),
            feels_like: round1(raw.main.feels_like),
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            wind_speed: round1(raw.wind.speed * 3.6),
            description: weather.description,
            icon: weather.icon,
        })
    }

    async fn forecast(&self, city: &str) -> Result<Vec<DailyForecast>> {
        let raw: RawForecast = self.fetch("forecast", city).await?;

        // One entry per calendar day; later 3-hourly entries replace
        // earlier ones.
        let mut days = BTreeMap::new();
        for item in raw.list {
            let Some(timestamp) = DateTime::<Utc>::from_timestamp(item.dt, 0) else {
                continue;
            };
            let weather = item.weather.into_iter().next().unwrap_or_default();
            days.insert(
                timestamp.date_naive(),
                DailyForecast {
                    date: timestamp.date_naive(),
                    temperature: round1(item.main.temp),
                    humidity: item.main.humidity,
                    pressure: item.main.pressure,
                    wind_speed: round1(item.wind.speed * 3.6),
                    description: weather.description,
                    icon: weather.icon,
                },
            );
        }

        Ok(days.into_values().collect())
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// Upstream response structures (subset we consume).

#[derive(Debug, Deserialize)]
struct RawCurrent {
    main: RawMain,
    wind: RawWind,
    #[serde(default)]
    weather: Vec<RawWeather>,
    name: String,
    sys: Option<RawSys>,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    list: Vec<RawForecastItem>,
}

#[derive(Debug, Deserialize)]
struct RawForecastItem {
    dt: i64,
    main: RawMain,
    wind: RawWind,
    #[serde(default)]
    weather: Vec<RawWeather>,
}

#[derive(Debug, Deserialize)]
struct RawMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct RawWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct RawWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct RawSys {
    country: Option<String>,
}
