use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Verify the bearer token and hand the caller's `Claims` to the handler
/// through request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::warn!("Request without bearer credentials");
            AppError::Unauthorized("Not authenticated".to_string())
        })?;

    let claims = state.verifier.verify(&token).await?;
    tracing::debug!("Authenticated subject {}", claims.sub);

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header (scheme is case-insensitive).
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
