//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use homesim_domain::error::HomeSimError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
}

/// Maps [`HomeSimError`] to an HTTP response with appropriate status code.
pub struct ApiError(HomeSimError);

impl From<HomeSimError> for ApiError {
    fn from(err: HomeSimError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, kind) = match &self.0 {
            HomeSimError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            HomeSimError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None),
            HomeSimError::Event(err) => (
                StatusCode::BAD_REQUEST,
                err.to_string(),
                Some(err.kind().to_string()),
            ),
            HomeSimError::Transport(err) => {
                tracing::error!(error = %err, "transport error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorBody { error, kind })).into_response()
    }
}
