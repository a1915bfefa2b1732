//! Domain models for the storefront.
//!
//! Plain structs returned by the repositories. There are no lazy relations:
//! a cart line carries the product it was joined with, nothing is fetched later.

pub mod cart;
pub mod flash;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{CartItem, CartLine, MAX_QUANTITY, cart_total};
pub use flash::{Flash, FlashLevel};
pub use product::{NewProduct, Product, SAMPLE_PRODUCTS};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
