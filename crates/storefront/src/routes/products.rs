//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use minimart_core::ProductId;

use super::{PageContext, ProductView, redirect_with};
use crate::db::ProductRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::Flash;
use crate::state::AppState;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub product: ProductView,
}

/// Display a single product. Unknown ids go back to the home page.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.pool()).get(id).await? else {
        return redirect_with(&session, Flash::danger("Product not found"), "/").await;
    };

    Ok(ProductTemplate {
        page: PageContext::load(&session, user).await,
        product: ProductView::from(&product),
    }
    .into_response())
}
