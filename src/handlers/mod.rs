//! # HTTP Request Handlers
//!
//! - `health`: liveness endpoints
//! - `auth`: current-user profile, token debugging, retired login routes
//! - `mydata`: read/overwrite the caller's health record
//! - `health_scan`: image upload to structured health data
//!
//! Protected handlers receive the verified `Claims` as an `Extension`, put
//! there by `middleware::auth::require_auth`.

pub mod auth;
pub mod health;
pub mod health_scan;
pub mod mydata;
