/// Error types for stories-service
///
/// Domain components raise typed failures; this module is the only place
/// they are translated into HTTP statuses. Every failure renders the
/// standard JSON envelope so callers can always parse `success`.
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::models::{API_CHANNEL, API_DEV};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("No account matches username {0}")]
    UserNotFound(String),

    #[error("Story not found")]
    StoryNotFound,

    #[error("Story has no downloadable media")]
    NoMediaAvailable,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Publish failed: {0}")]
    Publish(String),
}

#[derive(Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: String,
    api_dev: &'static str,
    api_channel: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::NoMediaAvailable => StatusCode::BAD_REQUEST,
            AppError::UserNotFound(_) | AppError::StoryNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            success: false,
            error: self.to_string(),
            api_dev: API_DEV,
            api_channel: API_CHANNEL,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        assert_eq!(
            AppError::BadRequest("missing".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NoMediaAvailable.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UserNotFound("alice".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::StoryNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Upstream("timeout".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Publish("upload".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_response_carries_attribution_envelope() {
        let response = AppError::StoryNotFound.error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
