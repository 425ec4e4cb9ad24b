//! # Error Handling
//!
//! Domain errors (`IdentityError`, `StoreError`, `ExtractError`) convert into
//! [`AppError`] with `?`, and `AppError` turns into a JSON response:
//!
//! ```json
//! { "error": "message safe to show the user" }
//! ```
//!
//! Details that could leak internals (provider bodies, SQL errors) are logged
//! with `tracing` and replaced by a generic message.

use crate::db::StoreError;
use crate::identity::IdentityError;
use crate::scan::ExtractError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Bad request errors (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No credentials on a protected route (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Endpoints of the retired self-hosted login (410)
    #[error("{0}")]
    Gone(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Identity(IdentityError::Unconfigured) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Identity provider not configured".to_string(),
            ),
            AppError::Identity(IdentityError::Unavailable(e)) => {
                tracing::error!("Signing keys unavailable: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Could not load identity provider keys".to_string(),
                )
            }
            AppError::Identity(IdentityError::InvalidToken(reason)) => {
                return bearer_challenge(format!("Invalid or expired token: {reason}"));
            }
            AppError::Unauthorized(_) => return bearer_challenge(self.to_string()),

            AppError::Store(StoreError::Misconfigured { table }) => {
                tracing::error!("Store table '{}' is missing", table);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    format!(
                        "My Data storage is not available. Create the table '{table}' \
                         (or start the server with AUTO_CREATE_TABLES=true)."
                    ),
                )
            }
            AppError::Store(StoreError::Unavailable(e)) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "My Data storage temporarily unavailable.".to_string(),
                )
            }

            AppError::Extract(e) => {
                let status = match e {
                    ExtractError::Unconfigured => StatusCode::SERVICE_UNAVAILABLE,
                    ExtractError::UnsupportedMediaType(_) | ExtractError::TooLarge(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    ExtractError::Provider(_) => StatusCode::BAD_GATEWAY,
                    ExtractError::MalformedResult(_) => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.to_string())
            }

            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Gone(_) => (StatusCode::GONE, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// 401 with the `WWW-Authenticate: Bearer` header.
fn bearer_challenge(message: String) -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": message })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::provider::ProviderError;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        Into::<AppError>::into(err).into_response().status()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_of(IdentityError::Unconfigured), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_of(IdentityError::Unavailable("timeout".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(IdentityError::InvalidToken("ExpiredSignature".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(StoreError::Unavailable("io".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ExtractError::UnsupportedMediaType("text/plain".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ExtractError::TooLarge(1)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ExtractError::Provider(ProviderError("down".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ExtractError::MalformedResult("no object".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(AppError::Gone("use the provider".into())), StatusCode::GONE);
    }

    #[test]
    fn auth_failures_carry_bearer_challenge() {
        let response = AppError::Unauthorized("Not authenticated".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let response = AppError::from(IdentityError::InvalidToken("bad".into())).into_response();
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
