//! Session-related types.
//!
//! Types stored in the session for authentication state. The session is the
//! server-side stand-in for the SPA's token-in-local-storage: it carries the
//! bearer token for the marketplace API plus a snapshot of `GET /auth/me`.

use serde::{Deserialize, Serialize};

use devshelf_core::{Email, UserId, UserRole};

use crate::marketplace::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
/// Refreshed whenever a handler receives a fresh `User` from the backend
/// (profile update, become-seller).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's backend ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Account role; gates the seller dashboard.
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this user may access seller routes.
    #[must_use]
    pub fn is_seller(&self) -> bool {
        matches!(self.role, UserRole::Seller | UserRole::Admin)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the marketplace API bearer token.
    pub const ACCESS_TOKEN: &str = "access_token";
}
