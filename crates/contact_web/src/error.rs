//! Server faults and their HTTP rendering.
//!
//! User input errors never arrive here; they are re-rendered as forms.

use crate::views;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use contact_core::ServiceError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AppError {
    Service(ServiceError),
    /// Blocking worker panicked or was cancelled.
    Worker(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(ServiceError::StorageTimeout { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Service(ServiceError::Storage(_)) | Self::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Service(ServiceError::StorageTimeout { .. }) => "storage_timeout",
            Self::Service(ServiceError::Storage(_)) => "storage_unavailable",
            Self::Worker(_) => "worker_failed",
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Worker(reason) => write!(f, "workflow worker failed: {reason}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Worker(_) => None,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(
            "event=request_failed module=http status=error http_status={} error_code={} error={}",
            status.as_u16(),
            self.error_code(),
            self
        );
        let message = match status {
            StatusCode::SERVICE_UNAVAILABLE => "The contact store is busy. Please try again.",
            _ => "The contact store is unavailable right now.",
        };
        (status, Html(views::error_page(message))).into_response()
    }
}
