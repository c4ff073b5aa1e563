use axum::extract::rejection::JsonRejection;
use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};

use kiku::data::ErrorResponse;
use kiku::errors::SessionError;
use kiku::log;

/// A failed request, rendered as `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    Session(SessionError),
    BadRequest(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Session(err) => match err {
                SessionError::SessionNotFound(_) | SessionError::QuestionNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                SessionError::Validation(_) => StatusCode::BAD_REQUEST,
                SessionError::SessionClosed | SessionError::Unauthorized => StatusCode::FORBIDDEN,
                SessionError::AlreadyVoted => StatusCode::CONFLICT,
                SessionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(message) => message,
            // Already logged by the service, don't leak paths to clients.
            ApiError::Session(SessionError::Storage(_)) => "Internal storage error".to_string(),
            ApiError::Session(err) => err.to_string(),
        };
        if status.is_server_error() {
            log::error!("Request failed with {}", status);
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
