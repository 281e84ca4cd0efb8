use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_ecotrack_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use ecotrack::backend::{AuthGateway, HttpBackendClient};
use ecotrack::config::AppConfig;
use ecotrack::error::AppError;
use ecotrack::lifecycle::{LifecycleService, RewardPolicy};
use ecotrack::session::SessionSlot;
use ecotrack::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let rewards = RewardPolicy::from_config(&config.rewards);
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        rewards: rewards.clone(),
    };

    let backend = Arc::new(HttpBackendClient::new(&config.backend)?);
    match backend.health().await {
        Ok(health) => info!(status = %health.status, "auth backend reachable"),
        Err(err) => warn!(error = %err, "auth backend health check failed; serving anyway"),
    }

    let service = Arc::new(LifecycleService::new(backend.clone(), rewards));
    let sessions = SessionSlot::default();

    let app = with_ecotrack_routes(service, backend, sessions)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        products_url = %config.backend.products_url,
        auth_url = %config.backend.auth_url,
        "ecotrack service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
