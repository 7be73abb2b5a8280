//! Middleware modules: errors, sessions, CSRF and auth extractors.

pub mod auth;
pub mod csrf;
pub mod error;
pub mod session;
