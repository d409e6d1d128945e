//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. Session layer (tower-sessions, in-memory store)

pub mod auth;
pub mod session;

pub use auth::{
    AuthSession, OptionalAuth, RequireAuth, RequireSeller, clear_session_auth, set_session_auth,
};
pub use session::create_session_layer;
