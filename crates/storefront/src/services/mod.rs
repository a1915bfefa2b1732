//! Business logic services.
//!
//! Services sit between the route handlers and the repositories.

pub mod auth;
pub mod cart;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService, parse_quantity};
