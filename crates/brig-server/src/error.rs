//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brig_core::responses::ErrorResponse;
use brig_db::error::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Malformed request: bad body, header, or upload.
    #[error("{0}")]
    BadRequest(String),

    /// The operation needs a known caller.
    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    /// Import endpoints report every failure as a client error.
    pub fn import_failed(err: impl std::fmt::Display) -> Self {
        Self::BadRequest(err.to_string())
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(DatabaseError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Database(DatabaseError::Validation(_) | DatabaseError::Import { .. })
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        let not_found = ApiError::from(DatabaseError::NotFound {
            entity: "Project".into(),
            id: "7".into(),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let import = ApiError::from(DatabaseError::Import {
            row: 3,
            reason: "bad".into(),
        });
        assert_eq!(import.status(), StatusCode::BAD_REQUEST);

        let broken = ApiError::from(DatabaseError::NoResult);
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
