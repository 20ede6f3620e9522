//! Black-box tests against the assembled router: real store on a temp
//! directory, real forecast service, upstream weather API replaced by a
//! wiremock server.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Days, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use weathervane::api::{self, AppState};
use weathervane::config::{Config, ModelConfig, ServerConfig, SourceConfig, StoreConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(dir: &TempDir, base_url: String) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            enable_cors: false,
            request_timeout_secs: 30,
        },
        source: SourceConfig {
            base_url,
            api_key: "test-key".to_string(),
            default_city: "Stockholm".to_string(),
            http_timeout_seconds: 5,
        },
        store: StoreConfig {
            data_dir: dir.path().to_path_buf(),
        },
        model: ModelConfig::default(),
    }
}

fn test_router(dir: &TempDir, base_url: String) -> Router {
    let cfg = test_config(dir, base_url);
    let state = AppState::new(cfg.clone()).expect("app state");
    api::router(state, &cfg)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Rejections (e.g. unparseable JSON bodies) come back as plain text.
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Rejections (e.g. unparseable JSON bodies) come back as plain text.
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn observation_body(days_ago: u64, temperature: f64) -> Value {
    let date = Utc::now().date_naive() - Days::new(days_ago);
    json!({
        "date": date.to_string(),
        "city": "Stockholm",
        "temperature": temperature,
        "humidity": 60.0 + (days_ago % 10) as f64,
        "wind_speed": 4.0 + (days_ago % 5) as f64,
        "precipitation": if days_ago % 4 == 0 { 1.5 } else { 0.0 },
        "pressure": 1010.0 + (days_ago % 7) as f64,
        "description": "clear sky"
    })
}

async fn seed_history(app: &Router, days: u64) {
    for i in 0..days {
        let temp = 15.0 + 5.0 * ((i as f64) / 4.0).sin();
        let (status, _) = post_json(
            app,
            "/api/v1/weather/observations",
            observation_body(days - 1 - i, temp),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn healthz_is_ok() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());
    let (status, _) = get(&app, "/api/v1/healthz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn predict_before_initialize_is_not_initialized() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());

    let (status, body) = get(&app, "/api/v1/predict").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "NotInitialized");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn initialize_without_history_reports_data_unavailable() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());

    let (status, body) = get(&app, "/api/v1/initialize").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "DataUnavailable");
}

#[tokio::test]
async fn initialize_then_predict_returns_all_attributes() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());
    seed_history(&app, 30).await;

    let (status, body) = get(&app, "/api/v1/initialize").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let report = body["data"].as_object().unwrap();
    assert_eq!(report.len(), 5);
    assert!(report.contains_key("temperature"));
    assert!(report["temperature"]["metrics"]["mse"].is_number());

    let (status, body) = get(&app, "/api/v1/predict").await;
    assert_eq!(status, StatusCode::OK);
    let predictions = body["data"].as_object().unwrap();
    assert_eq!(predictions.len(), 5);
    for key in ["temperature", "humidity", "wind_speed", "precipitation", "pressure"] {
        assert!(predictions[key].is_number(), "missing prediction for {key}");
    }
}

#[tokio::test]
async fn predict_is_deterministic_across_retrains() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());
    seed_history(&app, 30).await;

    let (status, _) = get(&app, "/api/v1/initialize").await;
    assert_eq!(status, StatusCode::OK);
    let (_, first) = get(&app, "/api/v1/predict").await;

    // Same data, same seed: retraining reproduces the same predictions.
    let (status, _) = get(&app, "/api/v1/initialize").await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = get(&app, "/api/v1/predict").await;

    assert_eq!(first["data"], second["data"]);
}

#[tokio::test]
async fn duplicate_observations_create_duplicate_rows() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());

    let body = observation_body(0, 20.0);
    let (status, _) = post_json(&app, "/api/v1/weather/observations", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(&app, "/api/v1/weather/observations", body).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/api/v1/weather/historical").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_observation_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());

    // Missing the numeric attribute columns entirely.
    let (status, _) = post_json(
        &app,
        "/api/v1/weather/observations",
        json!({"date": "2024-06-01", "city": "Stockholm"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = get(&app, "/api/v1/weather/historical").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn analysis_over_empty_window_is_no_data() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());

    let (status, body) = get(&app, "/api/v1/weather/analysis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "DataUnavailable");
}

#[tokio::test]
async fn analysis_reports_statistics_and_conditions() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());
    seed_history(&app, 10).await;

    let (status, body) = get(&app, "/api/v1/weather/analysis?city=Stockholm&days=30").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["data_points"], 10);
    assert!(data["attributes"]["temperature"]["mean"].is_number());
    assert!(data["attributes"]["temperature"]["std"].is_number());
    assert_eq!(data["weather_conditions"]["clear sky"], 10);

    // Unknown city: nothing in the window.
    let (status, _) = get(&app, "/api/v1/weather/analysis?city=Oslo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn historical_respects_inclusive_date_bounds() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, "http://unused.invalid".to_string());
    seed_history(&app, 5).await;

    let start = Utc::now().date_naive() - Days::new(3);
    let end = Utc::now().date_naive() - Days::new(1);
    let uri = format!("/api/v1/weather/historical?start_date={start}&end_date={end}");
    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn current_weather_records_to_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"temp": 21.5, "feels_like": 20.9, "humidity": 60.0, "pressure": 1013.0},
            "wind": {"speed": 3.4},
            "weather": [{"description": "scattered clouds", "icon": "03d"}],
            "name": "Stockholm",
            "sys": {"country": "SE"},
            "dt": 1717245000
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, server.uri());

    let (status, body) = get(&app, "/api/v1/weather/current").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], "Stockholm");
    assert_eq!(body["data"]["temperature"], 21.5);

    // The fetch fed both logs.
    let (status, body) = get(&app, "/api/v1/weather/recent?limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = get(&app, "/api/v1/weather/historical").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, server.uri());

    let (status, body) = get(&app, "/api/v1/weather/current").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "UpstreamError");
}

#[tokio::test]
async fn alerts_reflect_live_conditions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            // 32 C and 7 m/s (25.2 km/h): heat + wind alerts.
            "main": {"temp": 32.0, "feels_like": 35.0, "humidity": 60.0, "pressure": 1013.0},
            "wind": {"speed": 7.0},
            "weather": [{"description": "clear sky", "icon": "01d"}],
            "name": "Stockholm",
            "sys": {"country": "SE"},
            "dt": 1717245000
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let app = test_router(&dir, server.uri());

    let (status, body) = get(&app, "/api/v1/weather/alerts").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = body["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().all(|a| a["level"] == "warning"));
}
