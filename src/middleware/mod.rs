//! # Middleware Module
//!
//! Request interceptors that run before the route handlers.
//!
//! - `auth`: rejects requests without a valid bearer token and attaches the
//!   verified `Claims` to the request

pub mod auth;
