//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no analyzable files found in the upload")]
    NoEligibleFiles,

    #[error("invalid upload: {0}")]
    Upload(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NoEligibleFiles => (
                StatusCode::BAD_REQUEST,
                "no_eligible_files",
                self.to_string(),
            ),
            ApiError::Upload(msg) => (StatusCode::BAD_REQUEST, "invalid_upload", msg),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                type_: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    type_: String,
    message: String,
}
