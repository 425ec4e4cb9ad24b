use crate::db::models::Profile;
use crate::error::{AppError, AppResult};
use crate::identity::profile::resolve_profile;
use crate::identity::Claims;
use crate::middleware::auth::bearer_token;
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, Extension, Json};
use serde_json::{json, Value};

/// GET /auth/me
///
/// The caller's profile, created on first call. Storage problems degrade to a
/// profile built from the token, so this endpoint only fails on bad tokens.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<Profile> {
    Json(resolve_profile(state.profiles.as_ref(), &claims).await)
}

/// GET /auth/debug-token
///
/// Shows the unverified claims of the presented token and whether its
/// audience matches the configured app client. Only routed when
/// `AUTH_DEBUG_ENDPOINT` is on.
pub async fn debug_token(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let Some(token) = bearer_token(&headers) else {
        return Json(json!({ "error": "No token provided" }));
    };

    match state.verifier.inspect_unverified(token) {
        Ok(report) => Json(json!(report)),
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}

// Sign-up and sign-in happen against the identity provider directly.

pub async fn register_disabled() -> AppResult<()> {
    Err(AppError::Gone(
        "Use Cognito sign-up (frontend: Amplify Auth.signUp or Hosted UI).".to_string(),
    ))
}

pub async fn login_disabled() -> AppResult<()> {
    Err(AppError::Gone(
        "Use Cognito sign-in (frontend: Amplify Auth.signIn or Hosted UI).".to_string(),
    ))
}

pub async fn google_disabled() -> AppResult<()> {
    Err(AppError::Gone(
        "Use Cognito Google sign-in (frontend: Hosted UI or federatedSignIn).".to_string(),
    ))
}
