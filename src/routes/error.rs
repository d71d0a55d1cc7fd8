//! HTTP mapping of attempt errors: status code plus a JSON `{ "error": ... }` body.

use axum::{
    extract::rejection::JsonRejection,
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::AttemptError;
use crate::protocol::ErrorOut;

/// Seconds a client should wait before asking again while questions load.
const LOADING_RETRY_AFTER_SECS: &str = "1";

impl AttemptError {
    pub fn status(&self) -> StatusCode {
        match self {
            AttemptError::CatalogLoading => StatusCode::SERVICE_UNAVAILABLE,
            AttemptError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AttemptError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AttemptError::NotFound(_) => StatusCode::NOT_FOUND,
            AttemptError::AlreadySubmitted(_) => StatusCode::CONFLICT,
            AttemptError::Submission(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<JsonRejection> for AttemptError {
    fn from(rejection: JsonRejection) -> Self {
        AttemptError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for AttemptError {
    fn into_response(self) -> Response {
        let body = Json(ErrorOut { error: self.to_string() });
        match self {
            AttemptError::CatalogLoading => {
                (self.status(), [(RETRY_AFTER, LOADING_RETRY_AFTER_SECS)], body).into_response()
            }
            _ => (self.status(), body).into_response(),
        }
    }
}
