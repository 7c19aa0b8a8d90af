// --- File: crates/pushkeeper_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, PushkeeperError};

// Include the client module
pub mod client;

/// Extension trait for PushkeeperError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for PushkeeperError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

/// Implement IntoResponse for PushkeeperError to make it easier to use in Axum handlers.
impl IntoResponse for PushkeeperError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Convert a `Result<T, E>` into a JSON response, mapping the error through
/// `f` into a [`PushkeeperError`].
pub fn map_json_error<T, E, F>(result: Result<T, E>, f: F) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
    F: FnOnce(E) -> PushkeeperError,
{
    result.map(Json).map_err(|err| f(err).into_response())
}
