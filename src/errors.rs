// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code and JSON error body
#[derive(Error, Debug)]
pub enum GuideError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden access")]
    Forbidden,

    #[error("Internal server error")]
    InternalError,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl GuideError {
    /// Map a sqlx error, logging it with the failing operation
    pub fn from_db(context: &str, e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            // 23505 = unique_violation
            if db_err.code().as_deref() == Some("23505") {
                log::warn!("{}: unique constraint violated: {}", context, db_err);
                return GuideError::AlreadyExists(db_err.message().to_string());
            }
        }
        log::error!("{}: {}", context, e);
        GuideError::DatabaseError(e.to_string())
    }

    fn code(&self) -> &'static str {
        match self {
            GuideError::NotFound(_) => "NOT_FOUND",
            GuideError::AlreadyExists(_) => "ALREADY_EXISTS",
            GuideError::DatabaseError(_) => "DATABASE_ERROR",
            GuideError::InvalidInput(_) => "INVALID_INPUT",
            GuideError::ValidationError(_) => "VALIDATION_ERROR",
            GuideError::Unauthorized => "UNAUTHORIZED",
            GuideError::Forbidden => "FORBIDDEN",
            GuideError::InternalError => "INTERNAL_ERROR",
            GuideError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }
}

impl From<validator::ValidationErrors> for GuideError {
    fn from(e: validator::ValidationErrors) -> Self {
        GuideError::ValidationError(e.to_string())
    }
}

/// Convert GuideError to HTTP response
impl ResponseError for GuideError {
    fn error_response(&self) -> HttpResponse {
        // Database details stay in the server log
        let message = match self {
            GuideError::DatabaseError(_) => "Database error".to_string(),
            other => other.to_string(),
        };

        let body = json!({
            "error": {
                "code": self.code(),
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GuideError::NotFound(_) => StatusCode::NOT_FOUND,
            GuideError::AlreadyExists(_) => StatusCode::CONFLICT,
            GuideError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GuideError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GuideError::ValidationError(_) => StatusCode::BAD_REQUEST,
            GuideError::Unauthorized => StatusCode::UNAUTHORIZED,
            GuideError::Forbidden => StatusCode::FORBIDDEN,
            GuideError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            GuideError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GuideError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GuideError::AlreadyExists("slug".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(GuideError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(GuideError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            GuideError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            GuideError::ValidationError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_rt::test]
    async fn test_error_body_shape() {
        let resp = GuideError::NotFound("itinerary abc".into()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Not found: itinerary abc");
        assert!(body["error"]["timestamp"].is_string());
    }

    #[actix_rt::test]
    async fn test_database_details_hidden() {
        let resp = GuideError::DatabaseError("relation \"x\" does not exist".into())
            .error_response();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["message"], "Database error");
    }
}
