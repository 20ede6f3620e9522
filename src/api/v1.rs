use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AnalysisSummary, CurrentConditions, DailyForecast, Observation, WeatherAttribute,
};
use crate::ml::TrainingReport;

use super::{error::ApiError, response::ApiResponse, AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/initialize", get(initialize))
        .route("/predict", get(predict))
        .route("/weather/current", get(current_weather))
        .route("/weather/forecast", get(weather_forecast))
        .route("/weather/observations", post(store_observation))
        .route("/weather/analysis", get(weather_analysis))
        .route("/weather/historical", get(historical_weather))
        .route("/weather/recent", get(recent_weather))
        .route("/weather/alerts", get(weather_alerts))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /initialize - load the stored history and train the forecast models.
async fn initialize(
    State(st): State<AppState>,
) -> Result<ApiResponse<TrainingReport>, ApiError> {
    let report = st.forecaster.initialize().await?;
    Ok(ApiResponse::success(report))
}

/// GET /predict - next-day prediction per attribute, possibly partial.
async fn predict(
    State(st): State<AppState>,
) -> Result<ApiResponse<BTreeMap<WeatherAttribute, f64>>, ApiError> {
    let predictions = st.forecaster.predict_next().await?;
    Ok(ApiResponse::success(predictions))
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

/// GET /weather/current - fetch live conditions and record them.
async fn current_weather(
    State(st): State<AppState>,
    Query(q): Query<CityQuery>,
) -> Result<ApiResponse<CurrentConditions>, ApiError> {
    let city = q.city.unwrap_or_else(|| st.cfg.source.default_city.clone());
    let current = st
        .source
        .current(&city)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    st.store.record(&current)?;
    Ok(ApiResponse::success(current))
}

/// GET /weather/forecast - upstream multi-day forecast.
async fn weather_forecast(
    State(st): State<AppState>,
    Query(q): Query<CityQuery>,
) -> Result<ApiResponse<Vec<DailyForecast>>, ApiError> {
    let city = q.city.unwrap_or_else(|| st.cfg.source.default_city.clone());
    let forecast = st
        .source
        .forecast(&city)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    Ok(ApiResponse::success(forecast))
}

/// POST /weather/observations - append one reading to the history.
/// Duplicate submissions create duplicate rows; this is documented
/// behavior, not a bug.
async fn store_observation(
    State(st): State<AppState>,
    Json(observation): Json<Observation>,
) -> Result<ApiResponse<Observation>, ApiError> {
    st.store.append_observation(&observation)?;
    Ok(ApiResponse::success(observation))
}

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub city: Option<String>,
    #[serde(default = "default_analysis_days")]
    pub days: u64,
}

fn default_analysis_days() -> u64 {
    30
}

/// GET /weather/analysis - summary statistics over the trailing window.
async fn weather_analysis(
    State(st): State<AppState>,
    Query(q): Query<AnalysisQuery>,
) -> Result<ApiResponse<AnalysisSummary>, ApiError> {
    let summary = st.store.summarize(q.city.as_deref(), q.days)?;
    Ok(ApiResponse::success(summary))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub city: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// GET /weather/historical - range query, inclusive bounds.
async fn historical_weather(
    State(st): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<ApiResponse<Vec<Observation>>, ApiError> {
    let rows = st.store.query(q.city.as_deref(), q.start_date, q.end_date)?;
    Ok(ApiResponse::success(rows))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub city: Option<String>,
    #[serde(default = "default_recent_limit")]
    pub limit: usize,
}

fn default_recent_limit() -> usize {
    10
}

/// GET /weather/recent - tail of the current-conditions log.
async fn recent_weather(
    State(st): State<AppState>,
    Query(q): Query<RecentQuery>,
) -> Result<ApiResponse<Vec<CurrentConditions>>, ApiError> {
    let rows = st.store.recent(q.city.as_deref(), q.limit)?;
    Ok(ApiResponse::success(rows))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherAlert {
    pub level: AlertLevel,
    pub message: String,
}

/// GET /weather/alerts - threshold alerts on live conditions.
async fn weather_alerts(
    State(st): State<AppState>,
    Query(q): Query<CityQuery>,
) -> Result<ApiResponse<Vec<WeatherAlert>>, ApiError> {
    let city = q.city.unwrap_or_else(|| st.cfg.source.default_city.clone());
    let current = st
        .source
        .current(&city)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    Ok(ApiResponse::success(threshold_alerts(&current)))
}

fn threshold_alerts(current: &CurrentConditions) -> Vec<WeatherAlert> {
    let mut alerts = Vec::new();

    if current.temperature > 30.0 {
        alerts.push(WeatherAlert {
            level: AlertLevel::Warning,
            message: "High temperature alert: Stay hydrated and avoid prolonged sun exposure."
                .to_string(),
        });
    } else if current.temperature < 10.0 {
        alerts.push(WeatherAlert {
            level: AlertLevel::Info,
            message: "Low temperature alert: Dress warmly and be cautious of frost.".to_string(),
        });
    }

    if current.humidity > 80.0 {
        alerts.push(WeatherAlert {
            level: AlertLevel::Warning,
            message: "High humidity alert: Increased risk of heat-related illnesses.".to_string(),
        });
    }

    if current.wind_speed > 20.0 {
        alerts.push(WeatherAlert {
            level: AlertLevel::Warning,
            message: "Strong wind alert: Secure outdoor objects and be cautious.".to_string(),
        });
    }

    if alerts.is_empty() {
        alerts.push(WeatherAlert {
            level: AlertLevel::Success,
            message: "No weather alerts at this time.".to_string(),
        });
    }

    alerts
}
