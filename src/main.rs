use anyhow::Result;
use axum::Router;
use tracing::{info, warn};
use weathervane::{api, config::Config, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let cfg = Config::load()?;

    if cfg.source.api_key.is_empty() {
        warn!(
            "WEATHERVANE__SOURCE__API_KEY is not set - live weather endpoints will fail \
            until a key is configured; stored-history endpoints keep working"
        );
    }

    let app_state = api::AppState::new(cfg.clone())?;
    let app: Router = api::router(app_state, &cfg);

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!(
            "WARNING: Server binding to 0.0.0.0 - service will be accessible from network! \
            For production, bind to 127.0.0.1 unless behind a firewall/reverse proxy."
        );
    }

    info!(%addr, "starting weathervane");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
