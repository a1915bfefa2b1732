//! Account route handlers: registration, login and logout.
//!
//! Every POST ends in a redirect with a flash message. Failures never say
//! more than the user needs: a failed login does not reveal whether the email
//! exists.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::Response,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{PageContext, redirect_with};
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_session, establish_session};
use crate::models::Flash;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(session: Session, OptionalAuth(user): OptionalAuth) -> RegisterTemplate {
    RegisterTemplate {
        page: PageContext::load(&session, user).await,
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let result = AuthService::new(state.pool())
        .register(&form.username, &form.email, &form.password)
        .await;

    let message = match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Account created");
            return redirect_with(
                &session,
                Flash::success("Account created! Please login."),
                "/login",
            )
            .await;
        }
        Err(AuthError::DuplicateEmail) => "Email already registered!",
        Err(AuthError::DuplicateUsername) => "Username already taken!",
        Err(AuthError::InvalidEmail(_)) => "Please enter a valid email address.",
        Err(AuthError::InvalidUsername(_)) => "Please choose a username of up to 100 printable characters.",
        Err(AuthError::WeakPassword(_)) => "Password must be at least 8 characters.",
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(reason = message, "Registration rejected");
    redirect_with(&session, Flash::danger(message), "/register").await
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(session: Session, OptionalAuth(user): OptionalAuth) -> LoginTemplate {
    LoginTemplate {
        page: PageContext::load(&session, user).await,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .authenticate(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            establish_session(&session, &user).await?;
            set_sentry_user(&user.id, Some(user.username.as_str()));
            add_breadcrumb("auth", "Logged in", None);
            tracing::info!(user_id = %user.id, "User logged in");
            redirect_with(&session, Flash::success("Logged in successfully!"), "/").await
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::debug!("Login rejected");
            redirect_with(&session, Flash::danger("Invalid credentials!"), "/login").await
        }
        Err(e) => Err(e.into()),
    }
}

/// End the session. Works the same whether or not anyone was logged in.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    clear_session(&session).await?;
    clear_sentry_user();
    redirect_with(&session, Flash::info("Logged out successfully!"), "/").await
}
