pub mod error;
pub mod response;
pub mod v1;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::forecast::ForecastService;
use crate::source::{OpenWeatherClient, WeatherSource};
use crate::store::CsvStore;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub store: Arc<CsvStore>,
    pub forecaster: Arc<ForecastService>,
    pub source: Arc<dyn WeatherSource>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        let store = Arc::new(CsvStore::open(&cfg.store.data_dir)?);
        let source = Arc::new(OpenWeatherClient::new(&cfg.source)?);
        let forecaster = Arc::new(ForecastService::new(cfg.model.clone(), store.clone()));
        Ok(Self {
            cfg,
            store,
            forecaster,
            source,
        })
    }
}

pub fn router(state: AppState, cfg: &Config) -> Router {
    let mut router = Router::new().nest("/api/v1", v1::router(state));

    if cfg.server.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    cfg.server.request_timeout_secs,
                ))),
        )
        .layer(TraceLayer::new_for_http())
}
