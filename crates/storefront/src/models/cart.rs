//! The session cart.
//!
//! Only product IDs, quantities and cake messages are stored. Prices always
//! come from the catalog when the cart is priced, so a price change applies
//! to carts already in progress.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hearth_core::ProductId;
use hearth_core::models::Product;
use tower_sessions::Session;

use super::session::keys;

/// Most units of a single product per order.
pub const MAX_QUANTITY: u32 = 50;

/// Longest message we will pipe onto a cake.
pub const MAX_CAKE_MESSAGE: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub cake_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

fn clean_message(message: Option<&str>) -> Option<String> {
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| m.chars().take(MAX_CAKE_MESSAGE).collect())
}

impl Cart {
    /// The session's cart, empty when none was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        Ok(session.get::<Self>(keys::CART).await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(keys::CART, self).await
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines, for the header badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|l| l.product_id).collect()
    }

    /// Add units of a product. Adding to an existing line increases its
    /// quantity up to [`MAX_QUANTITY`]; a new non-empty message replaces the
    /// old one. A zero quantity is ignored.
    pub fn add(&mut self, product_id: ProductId, quantity: u32, cake_message: Option<&str>) {
        if quantity == 0 {
            return;
        }
        let message = clean_message(cake_message);
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity).min(MAX_QUANTITY);
            if message.is_some() {
                line.cake_message = message;
            }
        } else {
            self.lines.push(CartLine {
                product_id,
                quantity: quantity.min(MAX_QUANTITY),
                cake_message: message,
            });
        }
    }

    /// Set a line's quantity. Zero removes the line; larger values are capped.
    /// Returns whether the product was in the cart.
    pub fn update(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity.min(MAX_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Returns whether anything was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drop lines whose product is not among `available`. Returns whether
    /// anything was dropped.
    pub fn retain_available(&mut self, available: &[Product]) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| {
            available
                .iter()
                .any(|p| p.id == l.product_id && p.is_available)
        });
        self.lines.len() != before
    }

    /// Price the cart against catalog products. Lines without a matching
    /// available product are skipped.
    #[must_use]
    pub fn price(&self, products: &[Product]) -> PricedCart {
        let lines: Vec<PricedLine> = self
            .lines
            .iter()
            .filter_map(|line| {
                let product = products
                    .iter()
                    .find(|p| p.id == line.product_id && p.is_available)?;
                Some(PricedLine {
                    line_total: product.price * Decimal::from(line.quantity),
                    product: product.clone(),
                    quantity: line.quantity,
                    cake_message: line.cake_message.clone(),
                })
            })
            .collect();
        let subtotal = lines.iter().map(|l| l.line_total).sum();
        PricedCart { lines, subtotal }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product: Product,
    pub quantity: u32,
    pub cake_message: Option<String>,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
}

impl PricedCart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(id: i32, cents: i64, is_available: bool) -> Product {
        Product {
            id: ProductId::new(id),
            category_id: None,
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            description: String::new(),
            price: Decimal::new(cents, 2),
            image_url: None,
            is_available,
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_merges_and_caps_quantity() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2, None);
        cart.add(ProductId::new(1), 3, Some("  Happy Birthday  "));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 5);
        assert_eq!(cart.lines[0].cake_message.as_deref(), Some("Happy Birthday"));

        cart.add(ProductId::new(1), 100, None);
        assert_eq!(cart.lines[0].quantity, MAX_QUANTITY);
        assert_eq!(cart.lines[0].cake_message.as_deref(), Some("Happy Birthday"));

        cart.add(ProductId::new(2), 0, None);
        assert_eq!(cart.lines.len(), 1);
    }

    #[test]
    fn test_update_zero_removes_line() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2, None);
        cart.add(ProductId::new(2), 1, None);

        assert!(cart.update(ProductId::new(1), 0));
        assert_eq!(cart.product_ids(), vec![ProductId::new(2)]);

        assert!(cart.update(ProductId::new(2), 75));
        assert_eq!(cart.item_count(), MAX_QUANTITY);

        assert!(!cart.update(ProductId::new(9), 1));
    }

    #[test]
    fn test_price_uses_catalog_and_skips_unavailable() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2, None);
        cart.add(ProductId::new(2), 1, None);
        cart.add(ProductId::new(3), 1, None);

        let products = vec![product(1, 450, true), product(2, 1000, false)];
        let priced = cart.price(&products);
        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.subtotal, Decimal::new(900, 2));
        assert_eq!(priced.item_count(), 2);

        assert!(cart.retain_available(&products));
        assert_eq!(cart.product_ids(), vec![ProductId::new(1)]);
        assert!(!cart.retain_available(&products));
    }

    #[test]
    fn test_long_message_is_truncated() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 1, Some(&"x".repeat(200)));
        assert_eq!(
            cart.lines[0].cake_message.as_ref().map(String::len),
            Some(MAX_CAKE_MESSAGE)
        );
    }
}
