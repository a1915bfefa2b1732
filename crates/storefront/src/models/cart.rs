//! Cart types.
//!
//! A cart is just the set of `cart_item` rows owned by one user. Each row links
//! to a product rather than copying it, so the line total always reflects the
//! catalog's current price.

use minimart_core::{CartItemId, Price, ProductId, UserId};

use super::product::Product;

/// Largest quantity a cart line can hold. Adds saturate here and larger
/// updates are refused.
pub const MAX_QUANTITY: i32 = 9999;

/// One (user, product) row with a positive quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    /// Owning user. Only this user may change or remove the item.
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Always at least 1; a row with quantity 0 is deleted instead.
    pub quantity: u32,
}

impl CartItem {
    /// Whether `user_id` owns this item.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// A cart item joined with its product, for display and totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    /// Current product price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.item.quantity)
    }
}

/// Sum of all line totals. An empty cart totals zero.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::line_total).sum()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn line(item_id: i32, product_id: i32, price: u32, quantity: u32) -> CartLine {
        CartLine {
            item: CartItem {
                id: CartItemId::new(item_id),
                user_id: UserId::new(1),
                product_id: ProductId::new(product_id),
                quantity,
            },
            product: Product {
                id: ProductId::new(product_id),
                name: format!("Product {product_id}"),
                description: String::new(),
                price: Price::from_units(price),
                image: None,
            },
        }
    }

    #[test]
    fn test_total_is_decimal_exact() {
        let lines = [line(1, 1, 399, 1), line(2, 2, 699, 2)];
        let total = cart_total(&lines);
        assert_eq!(total.amount(), Decimal::new(179_700, 2));
        assert_eq!(total.to_string(), "$1797.00");
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        assert!(cart_total(&[]).is_zero());
    }

    #[test]
    fn test_line_total_follows_product_price() {
        let mut l = line(1, 1, 100, 3);
        assert_eq!(l.line_total(), Price::from_units(300));
        l.product.price = Price::from_units(120);
        assert_eq!(l.line_total(), Price::from_units(360));
    }

    #[test]
    fn test_ownership() {
        let l = line(1, 1, 10, 1);
        assert!(l.item.is_owned_by(UserId::new(1)));
        assert!(!l.item.is_owned_by(UserId::new(2)));
    }
}
