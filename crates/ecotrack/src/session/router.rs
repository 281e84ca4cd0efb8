use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{Role, SessionSlot};
use crate::backend::{AuthGateway, CompanyRegistration, Credentials, CustomerRegistration};
use crate::error::AppError;

pub struct SessionState<A> {
    pub auth: Arc<A>,
    pub sessions: SessionSlot,
}

impl<A> Clone for SessionState<A> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            sessions: self.sessions.clone(),
        }
    }
}

/// Login, logout, registration, and admin company review.
pub fn session_router<A>(auth: Arc<A>, sessions: SessionSlot) -> Router
where
    A: AuthGateway + 'static,
{
    Router::new()
        .route("/api/v1/session", get(current_session::<A>))
        .route("/api/v1/session/login", post(login::<A>))
        .route("/api/v1/session/logout", post(logout::<A>))
        .route(
            "/api/v1/accounts/customer",
            post(register_customer::<A>),
        )
        .route("/api/v1/accounts/company", post(register_company::<A>))
        .route("/api/v1/admin/companies", get(list_companies::<A>))
        .route(
            "/api/v1/admin/companies/:company_id/:decision",
            post(review_company::<A>),
        )
        .with_state(SessionState { auth, sessions })
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginBody {
    pub(crate) role: Role,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default, rename = "adminId", alias = "admin_id")]
    pub(crate) admin_id: Option<String>,
    pub(crate) password: String,
}

impl LoginBody {
    fn into_credentials(self) -> Option<Credentials> {
        let password = self.password;
        match self.role {
            Role::Customer => self
                .email
                .map(|email| Credentials::Customer { email, password }),
            Role::Company => self
                .email
                .map(|email| Credentials::Company { email, password }),
            Role::Admin => self
                .admin_id
                .map(|admin_id| Credentials::Admin { admin_id, password }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompanyFilter {
    #[serde(default)]
    pub(crate) pending: bool,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn current_session<A>(
    State(state): State<SessionState<A>>,
) -> Result<Response, AppError>
where
    A: AuthGateway + 'static,
{
    let session = state.sessions.require()?;
    Ok(Json(session).into_response())
}

pub(crate) async fn login<A>(
    State(state): State<SessionState<A>>,
    Json(body): Json<LoginBody>,
) -> Result<Response, AppError>
where
    A: AuthGateway + 'static,
{
    let Some(credentials) = body.into_credentials() else {
        return Ok(bad_request("email or adminId is required for this role"));
    };

    let session = state.auth.login(&credentials).await?;
    info!(identity = session.identity(), role = %session.role(), "signed in");
    state.sessions.sign_in(session.clone());
    Ok(Json(session).into_response())
}

pub(crate) async fn logout<A>(State(state): State<SessionState<A>>) -> Json<serde_json::Value>
where
    A: AuthGateway + 'static,
{
    let previous = state.sessions.sign_out();
    if let Some(session) = &previous {
        info!(identity = session.identity(), "signed out");
    }
    Json(json!({ "signed_out": previous.is_some() }))
}

pub(crate) async fn register_customer<A>(
    State(state): State<SessionState<A>>,
    Json(body): Json<CustomerRegistration>,
) -> Result<Response, AppError>
where
    A: AuthGateway + 'static,
{
    let ack = state.auth.register_customer(&body).await?;
    Ok((StatusCode::CREATED, Json(ack)).into_response())
}

pub(crate) async fn register_company<A>(
    State(state): State<SessionState<A>>,
    Json(body): Json<CompanyRegistration>,
) -> Result<Response, AppError>
where
    A: AuthGateway + 'static,
{
    let ack = state.auth.register_company(&body).await?;
    Ok((StatusCode::CREATED, Json(ack)).into_response())
}

pub(crate) async fn list_companies<A>(
    State(state): State<SessionState<A>>,
    Query(filter): Query<CompanyFilter>,
) -> Result<Response, AppError>
where
    A: AuthGateway + 'static,
{
    state.sessions.require()?.require(Role::Admin)?;
    let companies = if filter.pending {
        state.auth.pending_companies().await?
    } else {
        state.auth.all_companies().await?
    };
    Ok(Json(companies).into_response())
}

pub(crate) async fn review_company<A>(
    State(state): State<SessionState<A>>,
    Path((company_id, decision)): Path<(String, String)>,
) -> Result<Response, AppError>
where
    A: AuthGateway + 'static,
{
    state.sessions.require()?.require(Role::Admin)?;
    let ack = match decision.as_str() {
        "verify" => state.auth.verify_company(&company_id).await?,
        "reject" => state.auth.reject_company(&company_id).await?,
        _ => return Ok(bad_request("decision must be 'verify' or 'reject'")),
    };
    info!(company_id, decision, "company reviewed");
    Ok(Json(ack).into_response())
}
