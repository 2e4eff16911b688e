//! Request error taxonomy and the JSON error envelope

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::model::auth::AuthError;

/// Every failure a handler can surface. All of them render as the uniform
/// `{success: false, message, error?}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required secret or URL is absent or unusable
    #[error("{0}")]
    Configuration(String),

    /// Session envelope or inner token rejected
    #[error("{0}")]
    Authentication(#[from] AuthError),

    /// Public listing requested outside a recognized public page
    #[error("Access denied: not a recognized public page")]
    AccessDenied,

    /// Structurally invalid identifier or payload
    #[error("{0}")]
    Validation(String),

    /// Backend API answered with a non-success status, mirrored back
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        error: Option<serde_json::Value>,
    },

    /// Anything unexpected; never exposes internals beyond the message
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Shorthand for a 502 on connection-level upstream failures
    pub fn upstream_unreachable() -> Self {
        Self::Upstream {
            status: 502,
            message: "Upstream request failed".to_owned(),
            error: None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<pasetors::errors::Error> for ApiError {
    fn from(err: pasetors::errors::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "success": false,
            "message": self.to_string(),
        });

        match self {
            Self::Validation(reason) => body["error"] = json!(reason),
            Self::Upstream {
                error: Some(detail),
                ..
            } => body["error"] = detail.clone(),
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
