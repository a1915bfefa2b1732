//! Cart route handlers.
//!
//! All four handlers take [`RequireAuth`], so anonymous visitors are sent to
//! the login page before any cart data is touched. The acting user always
//! comes from the session, never from the request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use minimart_core::{CartItemId, ProductId};

use super::{PageContext, image_url, redirect_with};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{CartLine, Flash, MAX_QUANTITY};
use crate::services::{CartError, CartService, parse_quantity};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub item_id: String,
    pub product_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            item_id: line.item.id.to_string(),
            product_id: line.product.id.to_string(),
            name: line.product.name.clone(),
            image_url: line.product.image.as_deref().map(image_url),
            unit_price: line.product.price.to_string(),
            quantity: line.item.quantity,
            line_total: line.line_total().to_string(),
        }
    }
}

/// Update cart form data. `quantity` stays raw so a bad value can be
/// reported instead of rejected by the extractor.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    #[serde(default)]
    pub quantity: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
}

/// Checkout confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
}

/// Add one unit of a product to the cart.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Response> {
    match CartService::new(state.pool())
        .add_item(user.id, product_id)
        .await
    {
        Ok(_) => {
            add_breadcrumb(
                "cart",
                "Added product",
                Some(&[("product_id", &product_id.to_string())]),
            );
            redirect_with(&session, Flash::success("Product added to cart!"), "/").await
        }
        Err(CartError::NotFound) => {
            redirect_with(&session, Flash::danger("Product not found"), "/").await
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the cart with line totals and the cart total.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<CartTemplate> {
    let (lines, total) = CartService::new(state.pool()).view(user.id).await?;

    Ok(CartTemplate {
        page: PageContext::load(&session, Some(user)).await,
        lines: lines.iter().map(CartLineView::from).collect(),
        total: total.to_string(),
    })
}

/// Set the quantity of one cart item. Zero or less removes it.
#[instrument(skip_all, fields(user_id = %user.id, item_id = %item_id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<CartItemId>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let outcome = match parse_quantity(&form.quantity) {
        Ok(quantity) => {
            CartService::new(state.pool())
                .set_quantity(user.id, item_id, quantity)
                .await
        }
        Err(e) => Err(e),
    };

    let message = match outcome {
        Ok(Some(item)) => {
            add_breadcrumb(
                "cart",
                "Updated quantity",
                Some(&[("quantity", &item.quantity.to_string())]),
            );
            return Ok(Redirect::to("/cart").into_response());
        }
        Ok(None) => {
            add_breadcrumb("cart", "Removed item", None);
            return Ok(Redirect::to("/cart").into_response());
        }
        Err(CartError::InvalidQuantity(_)) => {
            format!("Quantity must be a whole number up to {MAX_QUANTITY}")
        }
        Err(CartError::NotFound) => "Cart item not found".to_owned(),
        Err(CartError::Forbidden) => "You cannot modify another user's cart".to_owned(),
        Err(e @ CartError::Repository(_)) => return Err(e.into()),
    };

    redirect_with(&session, Flash::danger(message), "/cart").await
}

/// Pay for and clear the cart, then show the confirmation.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<CheckoutTemplate> {
    let receipt = CartService::new(state.pool()).checkout(user.id).await?;
    add_breadcrumb("cart", "Checked out", None);

    let total = receipt.total.to_string();
    let page = PageContext::load(&session, Some(user)).await.with_flash(Flash::success(
        format!("Checkout successful! Total paid: {total}"),
    ));

    Ok(CheckoutTemplate {
        page,
        lines: receipt.lines.iter().map(CartLineView::from).collect(),
        total,
    })
}
