use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::ab_test::{AbTestError, AttributionError};
use crate::domain::contact::PhoneError;
use crate::domain::drive::DriveError;
use crate::domain::feed::FeedError;
use crate::domain::validation::ValidationErrors;
use crate::domain::video::WebhookError;
use crate::infrastructure::clients::MuxError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 502 Bad Gateway error for upstream failures
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// Creates a 503 Service Unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        }

        let body = Json(json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<String> for ApiError {
    fn from(message: String) -> Self {
        Self::internal_server_error(message)
    }
}

impl From<&str> for ApiError {
    fn from(message: &str) -> Self {
        Self::internal_server_error(message)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::bad_request(errors.to_string())
    }
}

impl From<AbTestError> for ApiError {
    fn from(err: AbTestError) -> Self {
        match err {
            AbTestError::Validation(errors) => errors.into(),
            AbTestError::InvalidTransition { .. } | AbTestError::NotRunning(_) => {
                Self::conflict(err.to_string())
            }
        }
    }
}

impl From<AttributionError> for ApiError {
    fn from(err: AttributionError) -> Self {
        match err {
            AttributionError::TestClosed => Self::conflict(err.to_string()),
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::UnknownTenant(_) | FeedError::NotConfigured => Self::not_found(err.to_string()),
            FeedError::Catalog(_) => Self::internal_server_error(err.to_string()),
        }
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::InvalidPayload(_) => Self::bad_request(err.to_string()),
            _ => Self::unauthorized(err.to_string()),
        }
    }
}

impl From<DriveError> for ApiError {
    fn from(err: DriveError) -> Self {
        match err {
            DriveError::NotConnected => Self::not_found(err.to_string()),
            DriveError::Unauthorized | DriveError::NeedsReauth => Self::conflict(err.to_string()),
            DriveError::RateLimited => Self::new(StatusCode::TOO_MANY_REQUESTS, err.to_string()),
            DriveError::Api(_) => Self::bad_gateway(err.to_string()),
            DriveError::Storage(_) => Self::internal_server_error(err.to_string()),
        }
    }
}

impl From<PhoneError> for ApiError {
    fn from(err: PhoneError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<MuxError> for ApiError {
    fn from(err: MuxError) -> Self {
        Self::bad_gateway(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ab_test::AbTestStatus;

    #[test]
    fn validation_errors_are_joined() {
        let mut errors = ValidationErrors::new();
        errors.push("Title is required");
        errors.push("Body is required");

        let err = ApiError::from(errors);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Title is required; Body is required");
    }

    #[test]
    fn domain_error_statuses() {
        let transition = AbTestError::InvalidTransition {
            from: AbTestStatus::Completed,
            to: AbTestStatus::Running,
        };
        assert_eq!(ApiError::from(transition).status, StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(WebhookError::SignatureMismatch).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::from(DriveError::NeedsReauth).status, StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(DriveError::RateLimited).status,
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::from(FeedError::UnknownTenant("acme".into())).status,
            StatusCode::NOT_FOUND
        );
    }
}
