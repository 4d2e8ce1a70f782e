//! Authorization rules in front of the repository. Every operation fails fast
//! with an [`AccessError`]; nothing is retried here.

pub mod executions;
pub mod snippets;
pub mod stats;
pub mod users;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::{models::Identity, store::StoreError};

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("A pro subscription is required to use this language")]
    ProRequired,

    #[error("{0}")]
    NotFound(String),

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub type AccessResult<T> = Result<T, AccessError>;

impl ResponseError for AccessError {
    fn status_code(&self) -> StatusCode {
        match self {
            AccessError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AccessError::Forbidden(_) | AccessError::ProRequired => StatusCode::FORBIDDEN,
            AccessError::NotFound(_) | AccessError::UserNotFound => StatusCode::NOT_FOUND,
            AccessError::Invalid(_) => StatusCode::BAD_REQUEST,
            AccessError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AccessError::Storage(err) => {
                log::error!("storage failure: {}", err);
                "Server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

pub(crate) fn require_identity(identity: Option<&Identity>) -> AccessResult<&Identity> {
    identity.ok_or(AccessError::Unauthenticated)
}

pub(crate) fn require_text(value: &str, field: &str) -> AccessResult<()> {
    if value.trim().is_empty() {
        return Err(AccessError::Invalid(format!("{field} must not be empty")));
    }
    Ok(())
}
