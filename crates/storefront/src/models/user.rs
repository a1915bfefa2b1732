//! User domain types.

use chrono::{DateTime, Utc};

use minimart_core::{Email, UserId, Username};

/// A registered storefront account.
///
/// The password hash is deliberately absent; it only travels between the
/// user repository and the auth service.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique display name.
    pub username: Username,
    /// Unique email address (exact match).
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
