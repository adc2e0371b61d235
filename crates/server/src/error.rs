//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;

/// Errors produced by the customer service.
///
/// Everything a caller can trip over has its own variant so the HTTP edge
/// can map precisely; store trouble is collapsed into [`Self::Store`] with
/// the cause attached for logging, never for display.
#[derive(Debug, Error)]
pub enum CustomerError {
    /// The authenticated user id is non-positive.
    #[error("user id is invalid")]
    InvalidUserId,

    /// The requested customer id is non-positive.
    #[error("customer id is invalid")]
    InvalidCustomerId,

    /// No live record with that id under that owner.
    #[error("customer not found")]
    NotFound,

    /// Create/modify submitted an empty name.
    #[error("customer name is required")]
    NameRequired,

    /// Name exceeds its bound.
    #[error("customer name is too long")]
    NameTooLong,

    /// Address exceeds its bound.
    #[error("customer address is too long")]
    AddressTooLong,

    /// Contact person exceeds its bound.
    #[error("customer contacts name is too long")]
    ContactsTooLong,

    /// Contact info exceeds its bound.
    #[error("customer contacts info is too long")]
    ContactsInfoTooLong,

    /// Comment exceeds its bound.
    #[error("customer comment is too long")]
    CommentTooLong,

    /// A modify request matched the stored record field for field. Reported
    /// distinctly so clients can treat it as "already in the desired state".
    #[error("nothing will be updated")]
    NothingToUpdate,

    /// Identifier generation failed; safe to retry later.
    #[error("system is busy")]
    SystemBusy,

    /// A query or transaction failed in the record store.
    #[error("operation failed")]
    Store(#[source] RepositoryError),
}

/// Application-level error type for the HTTP edge.
#[derive(Debug, Error)]
pub enum AppError {
    /// Customer service error.
    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// Request is missing a valid user identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Customer(CustomerError::Store(_))) {
            tracing::error!(error = ?self, "request failed on store error");
        }

        let status = match &self {
            Self::Customer(err) => match err {
                CustomerError::NotFound => StatusCode::NOT_FOUND,
                CustomerError::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,
                CustomerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Customer(CustomerError::Store(_)) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_masked() {
        let err = AppError::from(CustomerError::Store(RepositoryError::DataCorruption(
            "secret table layout".to_string(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::from(CustomerError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_busy_maps_to_503() {
        let response = AppError::from(CustomerError::SystemBusy).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
