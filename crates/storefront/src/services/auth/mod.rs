//! Authentication service.
//!
//! Password registration and login. Passwords are hashed with Argon2id and a
//! random salt; the raw password is never stored. Hashing and verification
//! run on the blocking thread pool so they do not stall request handling.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use minimart_core::{Email, Username};

use crate::db::RepositoryError;
use crate::db::users::{EMAIL_UNIQUE_CONSTRAINT, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash verified when the email is unknown, so a miss costs as much as a
/// wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("minimart-timing-equalizer").ok());

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with username, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` for malformed input.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    /// Returns `AuthError::DuplicateUsername` if the username is already taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = run_blocking({
            let password = password.to_owned();
            move || hash_password(&password)
        })
        .await?;

        // The unique constraints decide; a pre-check would race with a
        // concurrent registration of the same email.
        self.users
            .create(&username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(constraint) if constraint == EMAIL_UNIQUE_CONSTRAINT => {
                    AuthError::DuplicateEmail
                }
                RepositoryError::Conflict(_) => AuthError::DuplicateUsername,
                other => AuthError::Repository(other),
            })
    }

    /// Verify an email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is malformed or
    /// unknown, or the password is wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let found = match Email::parse(email) {
            Ok(email) => self.users.get_password_hash(&email).await?,
            Err(_) => None,
        };

        let (user, stored_hash) = match found {
            Some((user, hash)) => (Some(user), Some(hash)),
            None => (None, DUMMY_HASH.clone()),
        };

        let verified = run_blocking({
            let password = password.to_owned();
            move || {
                stored_hash.map_or(Err(AuthError::InvalidCredentials), |hash| {
                    verify_password(&password, &hash)
                })
            }
        })
        .await;

        match (user, verified) {
            (Some(user), Ok(())) => Ok(user),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

/// Run a CPU-heavy hashing closure off the async worker threads.
async fn run_blocking<T, F>(f: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
