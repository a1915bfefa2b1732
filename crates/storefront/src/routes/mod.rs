//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Product list
//! GET  /product/{id}            - Product detail
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness (database round-trip)
//!
//! # Accounts
//! GET  /register                - Registration form
//! POST /register                - Create account
//! GET  /login                   - Login form
//! POST /login                   - Authenticate
//! GET  /logout                  - End session
//!
//! # Cart (requires login)
//! GET  /add_to_cart/{product_id} - Add one unit
//! GET  /cart                     - Cart page
//! POST /update_cart/{item_id}    - Set quantity (<= 0 removes)
//! GET  /checkout                 - Pay and clear the cart
//! ```
//!
//! Every handler ends in either a rendered page or a 303 redirect. Expected
//! failures become a flash message on the next page; only storage failures
//! produce an error response.

pub mod auth;
pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};
use tower_sessions::{Session, SessionStore};

use crate::middleware::{
    create_session_layer, push_flash, request_id_middleware, security_headers_middleware,
    take_flashes,
};
use crate::models::{CurrentUser, Flash, Product};
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Per-request data every page template needs.
pub struct PageContext {
    /// Logged-in user, if any (drives the navigation links).
    pub current_user: Option<CurrentUser>,
    /// Messages queued by earlier requests, oldest first.
    pub flashes: Vec<Flash>,
}

impl PageContext {
    /// Build the context for a page about to render.
    ///
    /// Takes the pending flash messages, so call it only once the handler
    /// has decided to render rather than redirect.
    pub async fn load(session: &Session, current_user: Option<CurrentUser>) -> Self {
        Self {
            current_user,
            flashes: take_flashes(session).await,
        }
    }

    /// Append a message to show on this page itself.
    #[must_use]
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flashes.push(flash);
        self
    }
}

/// Product data for templates, with the price already formatted.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image_url: product.image.as_deref().map(image_url),
        }
    }
}

/// Public URL of a product image file.
#[must_use]
pub fn image_url(file: &str) -> String {
    format!("/static/images/{file}")
}

/// Queue `flash` and redirect (303) to `to`.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn redirect_with(
    session: &Session,
    flash: Flash,
    to: &str,
) -> crate::error::Result<Response> {
    push_flash(session, flash).await?;
    Ok(Redirect::to(to).into_response())
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/product/{id}", get(products::show))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/add_to_cart/{product_id}", get(cart::add))
        .route("/cart", get(cart::show))
        .route("/update_cart/{item_id}", axum::routing::post(cart::update))
        .route("/checkout", get(cart::checkout))
}

/// Build the complete application: routes, static files, health checks and
/// the middleware stack, with sessions kept in `store`.
pub fn app<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(store, state.config());
    let request_timeout = state.config().request_timeout;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::http::{HeaderMap, Method, header};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::middleware::SESSION_COOKIE_NAME;

    const UNUSED_DATABASE_URL: &str = "postgres://minimart@localhost:1/unused";

    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from(UNUSED_DATABASE_URL),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".parse().unwrap(),
            request_timeout: Duration::from_secs(5),
            auto_migrate: false,
            seed_catalog: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy(UNUSED_DATABASE_URL)
            .unwrap();
        app(AppState::new(config, pool), MemoryStore::default())
    }

    async fn send(app: &Router, method: Method, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn session_cookie(headers: &HeaderMap) -> String {
        let set_cookie = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(SESSION_COOKIE_NAME))
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_cart_routes_redirect_anonymous_visitors_to_login() {
        let app = test_app();
        for (method, uri) in [
            (Method::GET, "/cart"),
            (Method::GET, "/checkout"),
            (Method::GET, "/add_to_cart/1"),
            (Method::POST, "/update_cart/1"),
        ] {
            let response = send(&app, method, uri, None).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/login", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_login_page_shows_login_required_message_once() {
        let app = test_app();
        let response = send(&app, Method::GET, "/cart", None).await;
        let cookie = session_cookie(response.headers());

        let page = send(&app, Method::GET, "/login", Some(&cookie)).await;
        assert_eq!(page.status(), StatusCode::OK);
        let html = body_text(page).await;
        assert!(html.contains("Please login first!"));
        assert!(html.contains("alert-danger"));

        let again = body_text(send(&app, Method::GET, "/login", Some(&cookie)).await).await;
        assert!(!again.contains("Please login first!"));
    }

    #[tokio::test]
    async fn test_logout_without_session_is_harmless() {
        let app = test_app();
        let response = send(&app, Method::GET, "/logout", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let cookie = session_cookie(response.headers());
        let html = body_text(send(&app, Method::GET, "/register", Some(&cookie)).await).await;
        assert!(html.contains("Logged out successfully!"));
    }

    #[tokio::test]
    async fn test_forms_render_for_anonymous_visitors() {
        let app = test_app();

        let html = body_text(send(&app, Method::GET, "/register", None).await).await;
        assert!(html.contains(r#"name="username""#));
        assert!(html.contains(r#"name="email""#));
        assert!(html.contains(r#"name="password""#));

        let html = body_text(send(&app, Method::GET, "/login", None).await).await;
        assert!(html.contains(r#"action="/login""#));
        assert!(html.contains(r#"href="/register""#));
    }

    #[tokio::test]
    async fn test_security_headers_and_request_id() {
        let app = test_app();
        let response = send(&app, Method::GET, "/login", None).await;
        let headers = response.headers();
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert!(headers.get("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_session_cookie_attributes() {
        let app = test_app();
        let response = send(&app, Method::GET, "/cart", None).await;
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with(SESSION_COOKIE_NAME));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(!set_cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_static_css_is_served() {
        let app = test_app();
        let response = send(&app, Method::GET, "/static/css/main.css", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_product_view_formats_price() {
        let product = Product {
            id: minimart_core::ProductId::new(3),
            name: "Laptop".to_string(),
            description: "Powerful gaming laptop".to_string(),
            price: minimart_core::Price::from_units(1200),
            image: Some("laptop.jpg".to_string()),
        };
        let view = ProductView::from(&product);
        assert_eq!(view.id, "3");
        assert_eq!(view.price, "$1200.00");
        assert_eq!(view.image_url.as_deref(), Some("/static/images/laptop.jpg"));
    }
}
