use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Caller-visible failure taxonomy. Every variant maps to a stable `code`
/// string the front end branches on, so capacity, conflict and authorization
/// failures stay distinguishable even where the HTTP status overlaps.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    InvalidInput(String),

    #[error("you don't have permission to manage this resource")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("group is full")]
    GroupFull,

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::GroupFull => "group_full",
            ApiError::InvalidSignature => "invalid_signature",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::GroupFull => StatusCode::CONFLICT,
            ApiError::InvalidSignature => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal failures keep their detail server-side only.
        if let ApiError::Internal(detail) = self {
            log::error!("internal error: {}", detail);
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        }))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::InvalidInput(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_and_conflict_share_status_but_not_code() {
        let full = ApiError::GroupFull;
        let conflict = ApiError::Conflict("already requested".to_string());
        assert_eq!(full.status_code(), conflict.status_code());
        assert_ne!(full.code(), conflict.code());
    }

    #[test]
    fn internal_message_is_opaque() {
        let err = ApiError::Internal("db handle poisoned at groups.rs:42".to_string());
        assert_eq!(err.to_string(), "internal server error");
    }
}
