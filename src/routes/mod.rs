pub mod calendar;
pub mod home;

use std::any::Any;
use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use icsrelay_core::RelayError;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .merge(calendar::router())
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert relay errors to HTTP responses
pub struct AppError(pub RelayError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RelayError::InvalidUrl => StatusCode::BAD_REQUEST,
            RelayError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            // Only redirect and error codes are passed through
            RelayError::UpstreamStatus { status, .. } if (300..=599).contains(status) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RelayError::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
            RelayError::Decode(_) | RelayError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

/// Turn a handler panic into the standard 500 JSON error.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!(error = %message, "request handler panicked");

    AppError(RelayError::Unexpected(message)).into_response()
}

/// Address analytics events are keyed by: the first X-Forwarded-For entry
/// when running behind a proxy, otherwise the peer IP.
pub(crate) fn client_address(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(client) = forwarded {
        return client.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
