use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use ecotrack::backend::{AuthGateway, PickupGateway, ProductGateway};
use ecotrack::error::AppError;
use ecotrack::lifecycle::dashboard::BucketCountEntry;
use ecotrack::lifecycle::domain::deserialize_price;
use ecotrack::lifecycle::{
    lifecycle_router, summarize, BucketScheme, DashboardSummary, LifecycleService,
    ProductRecord, RewardQuote,
};
use ecotrack::session::{session_router, SessionSlot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryRequest {
    pub(crate) products: Vec<ProductRecord>,
    #[serde(default)]
    pub(crate) scheme: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SummaryResponse {
    pub(crate) summary: DashboardSummary,
    pub(crate) buckets: Vec<BucketCountEntry>,
    pub(crate) total_reward: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RewardEstimateRequest {
    #[serde(default)]
    pub(crate) material: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub(crate) price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) manufacture_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

/// Health, readiness, metrics, and the stateless computations. Needs an [`AppState`] extension layered on top.
pub(crate) fn service_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/dashboard/summary", post(dashboard_summary_endpoint))
        .route("/api/v1/rewards/estimate", post(reward_estimate_endpoint))
}

pub(crate) fn with_ecotrack_routes<G, A>(
    service: Arc<LifecycleService<G>>,
    auth: Arc<A>,
    sessions: SessionSlot,
) -> Router
where
    G: ProductGateway + PickupGateway + 'static,
    A: AuthGateway + 'static,
{
    lifecycle_router(service, sessions.clone())
        .merge(session_router(auth, sessions))
        .merge(service_routes())
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn dashboard_summary_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<SummaryRequest>,
) -> Result<Response, AppError> {
    let scheme = match payload.scheme.as_deref() {
        None => BucketScheme::default(),
        Some(raw) => match BucketScheme::parse(raw) {
            Some(scheme) => scheme,
            None => {
                let body = json!({ "error": format!("unknown scheme '{raw}'") });
                return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
            }
        },
    };

    let summary = summarize(&payload.products, scheme, &state.rewards);
    Ok(Json(SummaryResponse {
        buckets: summary.bucket_counts(),
        total_reward: summary.total_reward(),
        summary,
    })
    .into_response())
}

pub(crate) async fn reward_estimate_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RewardEstimateRequest>,
) -> Json<RewardQuote> {
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    let mut product = ProductRecord::new("estimate");
    product.material = payload.material;
    product.price = payload.price;
    product.manufacture_date = payload.manufacture_date;

    Json(state.rewards.estimate(&product, today))
}
