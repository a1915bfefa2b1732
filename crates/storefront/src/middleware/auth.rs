//! Authentication extractors and session helpers.
//!
//! The session holds a [`CurrentUser`] under [`session_keys::CURRENT_USER`]
//! once login succeeds. Handlers that need a user take [`RequireAuth`];
//! pages that only adapt their navigation take [`OptionalAuth`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::flash::push_flash;
use crate::models::{CurrentUser, Flash, User, session_keys};

/// Message shown after bouncing an anonymous visitor to the login page.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login first!";

/// Extractor that requires a logged-in user.
///
/// Anonymous requests are redirected to `/login` with a flash message, and
/// the handler never runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection produced by [`RequireAuth`].
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is missing from the router.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::MissingSession => {
                tracing::error!("Session extension missing; is the session layer installed?");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        match current_user(session).await {
            Some(user) => Ok(Self(user)),
            None => {
                if let Err(e) = push_flash(session, Flash::danger(LOGIN_REQUIRED_MESSAGE)).await {
                    tracing::warn!(error = %e, "Failed to store login-required message");
                }
                Err(AuthRejection::RedirectToLogin)
            }
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Bind the session to `user` after a successful login.
///
/// The session id is rotated first, so an id planted before login is useless
/// afterwards.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn establish_session(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_USER, CurrentUser::from(user))
        .await
}

/// End the session (logout). Safe to call when nobody is logged in.
///
/// # Errors
///
/// Returns an error if the session record cannot be deleted.
pub async fn clear_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use minimart_core::{Email, UserId, Username};
    use tower_sessions::MemoryStore;

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(7),
            username: Username::parse("alice").unwrap(),
            email: Email::parse("a@x.io").unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_establish_then_clear() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        establish_session(&session, &user()).await.unwrap();

        let current = current_user(&session).await.unwrap();
        assert_eq!(current.id, UserId::new(7));
        assert_eq!(current.username, "alice");

        clear_session(&session).await.unwrap();
        assert!(current_user(&session).await.is_none());

        // Logging out twice is harmless.
        clear_session(&session).await.unwrap();
    }
}
