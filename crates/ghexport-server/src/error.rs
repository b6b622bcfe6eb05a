// SPDX-License-Identifier: Apache-2.0

//! Error conversion from ghexport-core errors to HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ghexport_core::ExportError;
use serde::Serialize;
use tracing::{error, warn};

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human readable reason.
    pub error: String,
}

/// An error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message placed in the `error` field.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Maps `ExportError` variants to response statuses:
/// - `Validation` -> 400 with the bare message
/// - `Authentication` -> 401
/// - `RepositoryCreation` -> 400
/// - All others -> 500 prefixed with `Export failed:`
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        let (status, message) = match &err {
            ExportError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            ExportError::Authentication { .. } => (StatusCode::UNAUTHORIZED, err.to_string()),
            ExportError::RepositoryCreation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Export failed: {err}"),
            ),
        };
        Self { status, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), "{}", self.message);
        } else {
            warn!(status = self.status.as_u16(), "{}", self.message);
        }
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request_without_prefix() {
        let err = ApiError::from(ExportError::validation("Token and repository name are required"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Token and repository name are required");
    }

    #[test]
    fn authentication_maps_to_unauthorized() {
        let err = ApiError::from(ExportError::Authentication {
            status: 401,
            message: "Bad credentials".to_string(),
        });
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert!(err.message().contains("Bad credentials"));
    }

    #[test]
    fn repository_creation_maps_to_bad_request() {
        let err = ApiError::from(ExportError::RepositoryCreation {
            status: 422,
            message: "name already exists on this account".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message(),
            "Repository creation failed: name already exists on this account"
        );
    }

    #[test]
    fn enumeration_maps_to_internal_error() {
        let err = ApiError::from(ExportError::Enumeration {
            root: "/missing".to_string(),
            message: "No such file or directory".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().starts_with("Export failed: "));
        assert!(err.message().contains("/missing"));
    }

    #[test]
    fn config_maps_to_internal_error() {
        let err = ApiError::from(ExportError::Config {
            message: "bad toml".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
