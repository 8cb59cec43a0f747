use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use buildchat_llm_api::UpstreamError;
use buildchat_models::ErrorBody;

/// Errors a proxy request can end with before its body starts streaming
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing or invalid messages")]
    InvalidMessages { details: Option<String> },

    #[error("Upstream provider error")]
    Upstream(#[from] UpstreamError),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    pub fn invalid(details: impl Into<String>) -> Self {
        AppError::InvalidMessages {
            details: Some(details.into()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidMessages { .. } => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::InvalidMessages { details } => {
                tracing::debug!(details = ?details, "rejected chat request");
                let body = ErrorBody::new(self.to_string());
                match details {
                    Some(details) => body.with_details(details.clone()),
                    None => body,
                }
            }
            AppError::Upstream(e) => {
                // full error stays in the server log; the client only gets the classification
                tracing::error!(error = %e, "upstream request failed");
                ErrorBody::new(self.to_string()).with_details(e.summary())
            }
            AppError::MethodNotAllowed => ErrorBody::new(self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
