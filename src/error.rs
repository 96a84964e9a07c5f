use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::any::Any;
use std::fmt::Display;

use crate::engine::types::Unit;

/// Failures raised by a [`crate::store::MeasurementStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid stored value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    MeterPort,
    VirtualEnergyPort,
    FixedValuePort,
}

impl Display for PortKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::MeterPort => "Meter port",
            Self::VirtualEnergyPort => "Virtual port",
            Self::FixedValuePort => "Fixed value meter port",
        };
        f.write_str(label)
    }
}

/// Rejections produced while answering a condensation or aggregation request.
///
/// Computation over a fixed input is deterministic, so none of these are
/// retried. Store failures are carried through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    InvalidTimeSpan(String),
    #[error("{kind} {id} does not exist")]
    PortNotFound { kind: PortKind, id: i64 },
    #[error("No measurements within the time interval for meter port {port_id}")]
    NoDataInWindow { port_id: i64 },
    #[error(
        "Condensed function cannot generate valid output when meter port is not measuring energy. \
         Meter port {port_id} is measuring {unit}"
    )]
    UnsupportedUnit { port_id: i64, unit: Unit },
    #[error("Condensed function has no valid output (only one measurement was available maybe?)")]
    InsufficientData,
    #[error("Invalid tolerance '{given}'. You must provide a tolerance value: {allowed}")]
    InvalidToleranceValue { given: String, allowed: String },
    #[error("Invalid resolution '{given}'. You must provide following values for tau: {allowed}")]
    InvalidResolutionValue { given: String, allowed: String },
    #[error("Virtual port {0} has multiple entries")]
    AmbiguousVirtualPort(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn invalid_time_span(message: impl Into<String>) -> Self {
        Self::InvalidTimeSpan(message.into())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            not_found @ EngineError::PortNotFound { .. } => Self::not_found(not_found.to_string()),
            EngineError::Store(store_err) => internal_error(store_err),
            other => Self::bad_request(other.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub fn internal_error(err: impl Display) -> AppError {
    tracing::error!(error = %err, "internal error");
    AppError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Turns a handler panic caught by `CatchPanicLayer` into a logged 500.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    internal_error(format!("handler panicked: {detail}")).into_response()
}
