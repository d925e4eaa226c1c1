//! JSON error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use loadsmith_core::pipeline::PipelineError;
use serde::Serialize;
use utoipa::ToSchema;

/// Body of every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Diagnostic from the failing collaborator (model error, k6 stderr, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                details,
            },
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string(), err.details())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            Some(rejection.body_text()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PipelineError::InvalidPrompt, StatusCode::INTERNAL_SERVER_ERROR),
            (PipelineError::InvalidScript, StatusCode::BAD_REQUEST),
            (
                PipelineError::InvalidGeneratedScript {
                    output: "Sure!".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PipelineError::NoResultsAvailable { details: None },
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::Storage(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_details_omitted_when_absent() {
        let body = serde_json::to_value(ApiError::from(PipelineError::InvalidPrompt).body).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Prompt must not be empty"}));
    }
}
