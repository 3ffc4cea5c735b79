use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("invalid absolute_start_time or absolute_end_time")]
    InvalidRange,

    #[error("invalid aggregation unit: {0}")]
    InvalidAggregationUnit(String),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::MalformedEvent(err.to_string())
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Backend(err.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::MissingField(_)
            | RelayError::InvalidRange
            | RelayError::InvalidAggregationUnit(_)
            | RelayError::MalformedEvent(_) => StatusCode::BAD_REQUEST,
            RelayError::Backend(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
