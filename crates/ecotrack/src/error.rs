use crate::backend::BackendError;
use crate::config::ConfigError;
use crate::lifecycle::import::ProductImportError;
use crate::lifecycle::service::LifecycleServiceError;
use crate::session::SessionError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Json(serde_json::Error),
    Session(SessionError),
    Backend(BackendError),
    Import(ProductImportError),
    Service(LifecycleServiceError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Session(err) => session_status(err),
            AppError::Backend(err) => backend_status(err),
            AppError::Service(err) => match err {
                LifecycleServiceError::Session(err) => session_status(err),
                LifecycleServiceError::Backend(err) => backend_status(err),
                LifecycleServiceError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                LifecycleServiceError::NotClaimable(_) => StatusCode::CONFLICT,
                LifecycleServiceError::NothingSelected => StatusCode::BAD_REQUEST,
            },
            AppError::Import(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn session_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::Missing => StatusCode::UNAUTHORIZED,
        SessionError::WrongRole { .. } => StatusCode::FORBIDDEN,
    }
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Json(err) => write!(f, "invalid json: {}", err),
            AppError::Session(err) => write!(f, "{}", err),
            AppError::Backend(err) => write!(f, "{}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Service(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::Backend(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Service(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<BackendError> for AppError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<ProductImportError> for AppError {
    fn from(value: ProductImportError) -> Self {
        Self::Import(value)
    }
}

impl From<LifecycleServiceError> for AppError {
    fn from(value: LifecycleServiceError) -> Self {
        Self::Service(value)
    }
}
