//! Mapping of service errors onto HTTP responses

use crate::api::models::ErrorResponse;
use crate::error::RankerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Error returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    /// Request rejected before reaching the roster
    BadRequest(String),
    /// Error raised by the roster, storage or scenario layers
    Service(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(e) => match RankerError::find(e) {
                Some(RankerError::CharacterNotFound { .. }) => StatusCode::NOT_FOUND,
                Some(RankerError::DuplicateCharacter { .. }) => StatusCode::CONFLICT,
                Some(
                    RankerError::SelfMatch { .. }
                    | RankerError::InvalidCharacter { .. }
                    | RankerError::UnknownScenarioTag { .. }
                    | RankerError::NotEnoughCharacters { .. },
                ) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Service(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(message) => message,
            ApiError::Service(e) => {
                if status.is_server_error() {
                    error!("Request failed: {:#}", e);
                }
                e.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
