use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::domain::{deserialize_price, LifecycleStatus, NewCompanyProduct};
use super::import::ProductImporter;
use super::pickup::PickupStatus;
use super::service::LifecycleService;
use crate::backend::{PickupGateway, ProductGateway};
use crate::error::AppError;
use crate::session::SessionSlot;

/// Shared state for the lifecycle routes: the service plus the process session slot.
pub struct LifecycleState<G> {
    pub service: Arc<LifecycleService<G>>,
    pub sessions: SessionSlot,
}

impl<G> Clone for LifecycleState<G> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sessions: self.sessions.clone(),
        }
    }
}

/// Dashboard, product, and pickup endpoints acting as the signed-in session.
pub fn lifecycle_router<G>(service: Arc<LifecycleService<G>>, sessions: SessionSlot) -> Router
where
    G: ProductGateway + PickupGateway + 'static,
{
    Router::new()
        .route("/api/v1/dashboard/customer", get(customer_dashboard::<G>))
        .route("/api/v1/dashboard/company", get(company_dashboard::<G>))
        .route(
            "/api/v1/products",
            get(list_products::<G>).post(add_product::<G>),
        )
        .route("/api/v1/products/import", post(import_products::<G>))
        .route("/api/v1/products/status", post(bulk_update_status::<G>))
        .route("/api/v1/products/:rfid/scan", get(scan_product::<G>))
        .route("/api/v1/products/:rfid/claim", post(claim_product::<G>))
        .route("/api/v1/products/:rfid/status", put(update_status::<G>))
        .route(
            "/api/v1/pickups",
            get(list_pickups::<G>).post(request_pickup::<G>),
        )
        .route(
            "/api/v1/pickups/:pickup_id",
            axum::routing::delete(delete_pickup::<G>),
        )
        .route(
            "/api/v1/pickups/:pickup_id/status",
            put(update_pickup_status::<G>),
        )
        .with_state(LifecycleState { service, sessions })
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    pub(crate) search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusQuery {
    #[serde(default)]
    pub(crate) status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PickupFilter {
    #[serde(default)]
    pub(crate) status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewProductBody {
    pub(crate) product_name: String,
    #[serde(default)]
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) material: String,
    #[serde(default)]
    pub(crate) size: String,
    #[serde(default)]
    pub(crate) batch_no: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub(crate) price: Option<Decimal>,
    pub(crate) manufacture_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusBody {
    pub(crate) status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkStatusBody {
    pub(crate) rfids: Vec<String>,
    pub(crate) status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PickupBody {
    pub(crate) location: String,
    #[serde(default, rename = "preferredDate", alias = "preferred_date")]
    pub(crate) preferred_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PickupStatusBody {
    pub(crate) status: PickupStatus,
}

pub(crate) async fn customer_dashboard<G>(
    State(state): State<LifecycleState<G>>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let view = state.service.customer_dashboard(&session).await?;
    Ok(Json(view).into_response())
}

pub(crate) async fn company_dashboard<G>(
    State(state): State<LifecycleState<G>>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let view = state
        .service
        .company_dashboard(&session, query.search.as_deref())
        .await?;
    Ok(Json(view).into_response())
}

pub(crate) async fn list_products<G>(
    State(state): State<LifecycleState<G>>,
    Query(query): Query<StatusQuery>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let products = match query.status.as_deref() {
        Some(raw) => {
            let status = LifecycleStatus::parse(raw);
            state.service.products_with_status(&session, &status).await?
        }
        None => state.service.products(&session).await?,
    };
    Ok(Json(products).into_response())
}

pub(crate) async fn add_product<G>(
    State(state): State<LifecycleState<G>>,
    Json(body): Json<NewProductBody>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let product = NewCompanyProduct {
        company_email: session.identity().to_string(),
        name: body.product_name,
        category: body.category,
        material: body.material,
        size: body.size,
        batch_number: body.batch_no,
        price: body.price,
        manufacture_date: body.manufacture_date,
    };
    let ack = state.service.add_company_product(&session, product).await?;
    Ok((StatusCode::CREATED, Json(ack)).into_response())
}

/// Accepts the raw CSV as the request body.
pub(crate) async fn import_products<G>(
    State(state): State<LifecycleState<G>>,
    body: String,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let report = ProductImporter::from_reader(Cursor::new(body), session.identity())?;
    let outcome = state.service.import_products(&session, report).await?;
    let status = if outcome.is_complete() {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(outcome)).into_response())
}

pub(crate) async fn scan_product<G>(
    State(state): State<LifecycleState<G>>,
    Path(rfid): Path<String>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let scanned = state
        .service
        .scan_product(&session, &rfid, Utc::now())
        .await?;
    Ok(Json(scanned).into_response())
}

pub(crate) async fn claim_product<G>(
    State(state): State<LifecycleState<G>>,
    Path(rfid): Path<String>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let ack = state
        .service
        .claim_product(&session, &rfid, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(ack)).into_response())
}

pub(crate) async fn update_status<G>(
    State(state): State<LifecycleState<G>>,
    Path(rfid): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let ack = state
        .service
        .update_status(&session, &rfid, LifecycleStatus::parse(&body.status))
        .await?;
    Ok(Json(ack).into_response())
}

pub(crate) async fn bulk_update_status<G>(
    State(state): State<LifecycleState<G>>,
    Json(body): Json<BulkStatusBody>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let ack = state
        .service
        .bulk_update_status(&session, body.rfids, LifecycleStatus::parse(&body.status))
        .await?;
    Ok(Json(ack).into_response())
}

pub(crate) async fn request_pickup<G>(
    State(state): State<LifecycleState<G>>,
    Json(body): Json<PickupBody>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let ack = state
        .service
        .request_pickup(&session, body.location, body.preferred_date)
        .await?;
    Ok((StatusCode::CREATED, Json(ack)).into_response())
}

pub(crate) async fn list_pickups<G>(
    State(state): State<LifecycleState<G>>,
    Query(filter): Query<PickupFilter>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let pickups = match filter.status.as_deref().map(PickupStatus::parse) {
        Some(Some(status)) => state.service.pickups_by_status(&session, status).await?,
        Some(None) => {
            let payload = serde_json::json!({ "error": "unknown pickup status" });
            return Ok((StatusCode::BAD_REQUEST, Json(payload)).into_response());
        }
        None => state.service.pickups(&session).await?,
    };
    Ok(Json(pickups).into_response())
}

pub(crate) async fn update_pickup_status<G>(
    State(state): State<LifecycleState<G>>,
    Path(pickup_id): Path<String>,
    Json(body): Json<PickupStatusBody>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let ack = state
        .service
        .update_pickup_status(&session, &pickup_id, body.status)
        .await?;
    Ok(Json(ack).into_response())
}

pub(crate) async fn delete_pickup<G>(
    State(state): State<LifecycleState<G>>,
    Path(pickup_id): Path<String>,
) -> Result<Response, AppError>
where
    G: ProductGateway + PickupGateway + 'static,
{
    let session = state.sessions.require()?;
    let ack = state.service.delete_pickup(&session, &pickup_id).await?;
    Ok(Json(ack).into_response())
}
