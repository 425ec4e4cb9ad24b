//! # Router
//!
//! All routes, the auth middleware and the outer layers (CORS, tracing).

use crate::config::Config;
use crate::handlers::auth::{debug_token, google_disabled, login_disabled, me, register_disabled};
use crate::handlers::health::{health_check, root};
use crate::handlers::health_scan::analyze;
use crate::handlers::mydata::{get_my_data, save_my_data};
use crate::middleware::auth::require_auth;
use crate::scan::extractor::MAX_IMAGE_BYTES;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart framing around a maximum-size image.
const UPLOAD_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    // Routes that need a verified bearer token
    let protected = Router::new()
        .route("/auth/me", get(me))
        .route("/mydata", get(get_my_data).put(save_my_data))
        .route(
            "/health-scan/analyze",
            post(analyze).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + UPLOAD_OVERHEAD_BYTES)),
        )
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // Retired self-hosted login
        .route("/auth/register", post(register_disabled))
        .route("/auth/login", post(login_disabled))
        .route("/auth/google", post(google_disabled));

    if state.config.auth_debug_endpoint {
        tracing::warn!("GET /auth/debug-token is enabled");
        app = app.route("/auth/debug-token", get(debug_token));
    }

    app.merge(protected)
        .layer(cors(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}
