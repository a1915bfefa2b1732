//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::{PageContext, ProductView};
use crate::db::ProductRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Home page template: the whole catalog.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
    pub products: Vec<ProductView>,
}

/// Display every product, ordered by id.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<IndexTemplate> {
    let products = ProductRepository::new(state.pool()).list().await?;

    Ok(IndexTemplate {
        page: PageContext::load(&session, user).await,
        products: products.iter().map(ProductView::from).collect(),
    })
}
