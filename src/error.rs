use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

/// Error taxonomy surfaced to HTTP callers. Each variant carries a stable
/// machine-readable kind so clients can key behavior off it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token")]
    MalformedToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("user not found")]
    UnknownUser,
    #[error("account is deactivated")]
    AccountDeactivated,
    #[error("admin privileges required")]
    InsufficientRole,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingToken => "missing_token",
            ApiError::MalformedToken => "malformed_token",
            ApiError::ExpiredToken => "expired_token",
            ApiError::UnknownUser => "unknown_user",
            ApiError::AccountDeactivated => "account_deactivated",
            ApiError::InsufficientRole => "insufficient_role",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::DuplicateEmail => "duplicate_email",
            ApiError::NotFound => "not_found",
            ApiError::Validation(_) => "validation",
            ApiError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingToken
            | ApiError::MalformedToken
            | ApiError::ExpiredToken
            | ApiError::UnknownUser
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::AccountDeactivated | ApiError::InsufficientRole => StatusCode::FORBIDDEN,
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Backend(e) => ApiError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal faults stay opaque; the source is logged, never returned.
        if let ApiError::Internal(ref source) = self {
            error!(error = %source, "internal error");
        }
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct_per_variant() {
        let errors = [
            ApiError::MissingToken,
            ApiError::MalformedToken,
            ApiError::ExpiredToken,
            ApiError::UnknownUser,
            ApiError::AccountDeactivated,
            ApiError::InsufficientRole,
            ApiError::InvalidCredentials,
            ApiError::DuplicateEmail,
            ApiError::NotFound,
            ApiError::Validation("bad".into()),
            ApiError::Internal(anyhow::anyhow!("boom")),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn internal_message_is_opaque() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused at 10.0.0.3:5432"));
        assert_eq!(err.to_string(), "internal server error");
    }

    #[test]
    fn store_errors_map_to_api_kinds() {
        assert_eq!(
            ApiError::from(StoreError::DuplicateEmail).kind(),
            "duplicate_email"
        );
        assert_eq!(ApiError::from(StoreError::NotFound).kind(), "not_found");
    }
}
