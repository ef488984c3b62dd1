//! The session-held cart.
//!
//! The cart is the one piece of state shared across the storefront: the menu
//! adds to it, the cart page mutates it, and checkout drains it. It is plain
//! data (serde-serializable) so the web layer can keep it in the visitor's
//! session and re-save it after each mutation.
//!
//! # Invariant
//!
//! `total = Σ unit_price × quantity − discount`, clamped at zero. Quantities
//! are always at least one; updating a line to quantity zero removes it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartItemId, DiscountId, ProductId, RestaurantId};

/// A single line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart-local line ID (stable across quantity updates).
    pub id: CartItemId,
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Restaurant the product belongs to.
    pub restaurant_id: RestaurantId,
    /// Product name snapshot, for display.
    pub name: String,
    /// Unit price snapshot at the time the product was added.
    pub unit_price: Decimal,
    /// Number of units, always >= 1.
    pub quantity: u32,
    /// Free-form preparation note ("no onions").
    pub observation: Option<String>,
}

impl CartItem {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A discount resolved by the platform and applied to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    /// Platform discount ID, forwarded on order submission.
    pub id: DiscountId,
    /// Absolute amount subtracted from the subtotal.
    pub amount: Decimal,
}

/// Input for [`Cart::add`].
#[derive(Debug, Clone)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub observation: Option<String>,
}

/// Ordered list of selected products plus an optionally applied discount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    discount: Option<AppliedDiscount>,
    /// Source for the next line ID. Monotonic within one cart's lifetime.
    next_item_id: i32,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lines currently in the cart, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The applied discount, if any.
    #[must_use]
    pub const fn discount(&self) -> Option<AppliedDiscount> {
        self.discount
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of line prices before any discount.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_price).sum()
    }

    /// Amount subtracted by the applied discount (zero when none).
    #[must_use]
    pub fn discount_amount(&self) -> Decimal {
        self.discount.map_or(Decimal::ZERO, |d| d.amount)
    }

    /// Final price: subtotal minus discount, never negative.
    #[must_use]
    pub fn total(&self) -> Decimal {
        (self.subtotal() - self.discount_amount()).max(Decimal::ZERO)
    }

    /// Restaurant of the first line. Orders are placed against a single
    /// restaurant, so checkout reads this.
    #[must_use]
    pub fn restaurant_id(&self) -> Option<RestaurantId> {
        self.items.first().map(|item| item.restaurant_id)
    }

    /// Add a product to the cart, returning the affected line's ID.
    ///
    /// Adding a product that is already in the cart increments the existing
    /// line instead of creating a duplicate; a new observation replaces the
    /// old one. A zero quantity is treated as one.
    pub fn add(&mut self, input: AddToCart) -> CartItemId {
        let quantity = input.quantity.max(1);

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == input.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
            if input.observation.is_some() {
                existing.observation = input.observation;
            }
            return existing.id;
        }

        let id = CartItemId::new(self.next_item_id);
        self.next_item_id += 1;
        self.items.push(CartItem {
            id,
            product_id: input.product_id,
            restaurant_id: input.restaurant_id,
            name: input.name,
            unit_price: input.unit_price,
            quantity,
            observation: input.observation,
        });
        id
    }

    /// Set a line's quantity. Quantity zero removes the line.
    ///
    /// Returns `false` if no line with the given ID exists.
    pub fn update_quantity(&mut self, item_id: CartItemId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(item_id);
        }

        match self.items.iter_mut().find(|item| item.id == item_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line from the cart.
    ///
    /// Returns `false` if no line with the given ID exists.
    pub fn remove(&mut self, item_id: CartItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != item_id);
        self.items.len() != before
    }

    /// Apply a platform-resolved discount, replacing any previous one.
    ///
    /// Negative amounts are clamped to zero so a misbehaving backend can
    /// never inflate the total.
    pub fn apply_discount(&mut self, id: DiscountId, amount: Decimal) {
        self.discount = Some(AppliedDiscount {
            id,
            amount: amount.max(Decimal::ZERO),
        });
    }

    /// Drop all lines and the discount. Called only after a confirmed order
    /// submission.
    pub fn clear(&mut self) {
        self.items.clear();
        self.discount = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burger() -> AddToCart {
        AddToCart {
            product_id: ProductId::new(1),
            restaurant_id: RestaurantId::new(10),
            name: "X-Salada".to_string(),
            unit_price: Decimal::new(2550, 2), // 25.50
            quantity: 2,
            observation: None,
        }
    }

    fn juice() -> AddToCart {
        AddToCart {
            product_id: ProductId::new(2),
            restaurant_id: RestaurantId::new(10),
            name: "Suco de laranja".to_string(),
            unit_price: Decimal::new(800, 2), // 8.00
            quantity: 1,
            observation: Some("sem gelo".to_string()),
        }
    }

    #[test]
    fn test_total_is_sum_of_line_prices() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.add(juice());

        assert_eq!(cart.subtotal(), Decimal::new(5900, 2));
        assert_eq!(cart.total(), Decimal::new(5900, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_discount_reduces_total() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.apply_discount(DiscountId::new(7), Decimal::new(1000, 2));

        assert_eq!(cart.total(), Decimal::new(4100, 2));
    }

    #[test]
    fn test_total_never_negative() {
        let mut cart = Cart::new();
        cart.add(juice());
        cart.apply_discount(DiscountId::new(7), Decimal::new(100_00, 2));

        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_negative_discount_clamped() {
        let mut cart = Cart::new();
        cart.add(juice());
        cart.apply_discount(DiscountId::new(7), Decimal::new(-500, 2));

        assert_eq!(cart.total(), cart.subtotal());
    }

    #[test]
    fn test_add_same_product_merges_lines() {
        let mut cart = Cart::new();
        let first = cart.add(burger());
        let second = cart.add(burger());

        assert_eq!(first, second);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_add_zero_quantity_treated_as_one() {
        let mut cart = Cart::new();
        let mut input = burger();
        input.quantity = 0;
        cart.add(input);

        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new();
        let id = cart.add(burger());

        assert!(cart.update_quantity(id, 5));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        let id = cart.add(burger());

        assert!(cart.update_quantity(id, 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_unknown_line() {
        let mut cart = Cart::new();
        cart.add(burger());

        assert!(!cart.update_quantity(CartItemId::new(99), 3));
        assert!(!cart.remove(CartItemId::new(99)));
    }

    #[test]
    fn test_remove_keeps_other_lines() {
        let mut cart = Cart::new();
        let id = cart.add(burger());
        cart.add(juice());

        assert!(cart.remove(id));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].name, "Suco de laranja");
    }

    #[test]
    fn test_clear_drops_items_and_discount() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.apply_discount(DiscountId::new(7), Decimal::new(500, 2));

        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.discount().is_none());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_restaurant_id_from_first_line() {
        let mut cart = Cart::new();
        assert_eq!(cart.restaurant_id(), None);
        cart.add(burger());
        assert_eq!(cart.restaurant_id(), Some(RestaurantId::new(10)));
    }

    #[test]
    fn test_session_roundtrip() {
        // The cart lives in the session store, so its serde shape matters.
        let mut cart = Cart::new();
        cart.add(burger());
        cart.apply_discount(DiscountId::new(7), Decimal::new(500, 2));

        let json = serde_json::to_string(&cart).expect("serialize");
        let back: Cart = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, cart);
    }
}
