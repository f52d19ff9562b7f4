//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain_rating::RatingError;
use infra_tables::LoadError;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error")]
    Validation(Vec<String>),

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error("Table load failed: {0}")]
    TableLoad(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request".to_string(), msg.clone(), None),
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error".to_string(),
                "Request failed validation".to_string(),
                Some(fields.clone()),
            ),
            ApiError::Rating(err) => {
                // Out-of-range values come from the tables, not the caller
                let status = match err {
                    RatingError::RatingOutOfRange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (
                    status,
                    err.code().to_ascii_lowercase(),
                    err.to_string(),
                    Some(vec![format!("stage: {}", err.stage())]),
                )
            }
            ApiError::TableLoad(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "table_load_error".to_string(), msg.clone(), None),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error".to_string(), msg.clone(), None),
        };

        let body = ErrorResponse {
            error: error_type,
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        ApiError::TableLoad(err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .errors()
            .keys()
            .map(|field| format!("{} is invalid", field))
            .collect();
        fields.sort();
        ApiError::Validation(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use domain_rating::RatingStage;

    #[test]
    fn test_rating_errors_are_unprocessable() {
        let err = ApiError::from(RatingError::UnclassifiedOccupation {
            title: "Astronaut".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_out_of_range_is_internal() {
        let err = ApiError::from(RatingError::RatingOutOfRange {
            stage: RatingStage::AgeAdjustment,
            value: dec!(104),
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
