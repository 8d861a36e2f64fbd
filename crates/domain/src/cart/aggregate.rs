//! Cart aggregate implementation.

use common::{ProductId, SessionId};
use serde::{Deserialize, Serialize};

use super::{CartError, LineItem, ProductSnapshot, Quantity};
use crate::money::{Money, MoneyError};

/// Derived cart totals, recomputed on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of unit price × quantity over all line items.
    pub items_total: Money,
    /// Total quantity across all line items.
    pub item_count: u32,
}

/// Cart aggregate root.
///
/// One cart per session, one logical writer at a time: the owning
/// session's request handler is the only mutator, so the aggregate itself
/// carries no locking. Line items keep their insertion order, which only
/// matters for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    session_id: SessionId,
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart for a session.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            items: Vec::new(),
        }
    }

    /// Returns the owning session.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the line item for a product, if present.
    pub fn get_item(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Returns the number of distinct products.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a product to the cart.
    ///
    /// If the product is already present, the quantity is replaced (not
    /// added to) and the captured name, image, unit price, and stock limit
    /// are refreshed from the snapshot. No two line items ever share a
    /// product id.
    pub fn add_item(&mut self, snapshot: &ProductSnapshot, quantity: u32) -> Result<(), CartError> {
        let quantity = Quantity::new(quantity, snapshot.stock_limit)?;
        self.check_currency(snapshot.price)?;

        let item = LineItem::new(snapshot, quantity);
        match self
            .items
            .iter_mut()
            .find(|i| i.product_id == snapshot.product_id)
        {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Sets the quantity of an existing line item.
    ///
    /// Fails with `OutOfStock` when the quantity falls outside
    /// `1..=stock_limit` for the limit captured at add-time; the cart is
    /// left unchanged on failure.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| &i.product_id == product_id)
            .ok_or_else(|| CartError::ItemNotFound(product_id.clone()))?;

        item.quantity = Quantity::new(quantity, item.stock_limit)?;
        Ok(())
    }

    /// Removes a line item. Absent products are a no-op, not an error.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.items.retain(|i| &i.product_id != product_id);
    }

    /// Empties the cart. Invoked after a successful order submission.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Computes the derived totals over the current line items.
    pub fn totals(&self) -> Result<CartTotals, CartError> {
        let currency = self
            .items
            .first()
            .map(|i| i.unit_price.currency())
            .unwrap_or_default();

        let mut items_total = Money::zero(currency);
        let mut item_count = 0u32;
        for item in &self.items {
            items_total = items_total.add(item.line_total())?;
            item_count += item.quantity.get();
        }

        Ok(CartTotals {
            items_total,
            item_count,
        })
    }

    // All items in one cart carry the same currency; mixing would make
    // the derived total meaningless.
    fn check_currency(&self, price: Money) -> Result<(), CartError> {
        if let Some(first) = self.items.first()
            && first.unit_price.currency() != price.currency()
        {
            return Err(CartError::Money(MoneyError::CurrencyMismatch {
                left: first.unit_price.currency().code(),
                right: price.currency().code(),
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn cart() -> Cart {
        Cart::new(SessionId::new("sess-1"))
    }

    fn snapshot(id: &str, price: Money, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image: format!("/images/{id}.jpg"),
            price,
            stock_limit: stock,
        }
    }

    #[test]
    fn add_item_appends_in_insertion_order() {
        let mut cart = cart();
        cart.add_item(&snapshot("SKU-001", Money::inr(500), 5), 1)
            .unwrap();
        cart.add_item(&snapshot("SKU-002", Money::inr(300), 5), 2)
            .unwrap();

        let ids: Vec<_> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["SKU-001", "SKU-002"]);
    }

    #[test]
    fn add_existing_product_replaces_quantity_and_refreshes_snapshot() {
        let mut cart = cart();
        cart.add_item(&snapshot("SKU-001", Money::inr(500), 5), 2)
            .unwrap();

        // Catalog price and stock changed since first add.
        cart.add_item(&snapshot("SKU-001", Money::inr(450), 8), 3)
            .unwrap();

        assert_eq!(cart.line_count(), 1);
        let item = cart.get_item(&ProductId::new("SKU-001")).unwrap();
        assert_eq!(item.quantity.get(), 3, "replaced, not summed");
        assert_eq!(item.unit_price, Money::inr(450));
        assert_eq!(item.stock_limit, 8);
    }

    #[test]
    fn add_item_rejects_quantity_beyond_stock() {
        let mut cart = cart();
        let result = cart.add_item(&snapshot("SKU-001", Money::inr(500), 3), 4);
        assert!(matches!(result, Err(CartError::OutOfStock { .. })));
        assert!(cart.is_empty());
    }

    #[test]
    fn add_item_rejects_mixed_currencies() {
        let mut cart = cart();
        cart.add_item(&snapshot("SKU-001", Money::inr(500), 5), 1)
            .unwrap();
        let usd = Money::from_minor(1000, Currency::Usd).unwrap();
        let result = cart.add_item(&snapshot("SKU-002", usd, 5), 1);
        assert!(matches!(
            result,
            Err(CartError::Money(MoneyError::CurrencyMismatch { .. }))
        ));
    }

    #[test]
    fn update_quantity_within_captured_limit() {
        let mut cart = cart();
        cart.add_item(&snapshot("SKU-001", Money::inr(500), 3), 1)
            .unwrap();
        cart.update_quantity(&ProductId::new("SKU-001"), 3).unwrap();
        assert_eq!(
            cart.get_item(&ProductId::new("SKU-001"))
                .unwrap()
                .quantity
                .get(),
            3
        );
    }

    #[test]
    fn update_quantity_beyond_stock_leaves_cart_unchanged() {
        let mut cart = cart();
        cart.add_item(&snapshot("SKU-001", Money::inr(500), 3), 2)
            .unwrap();

        let result = cart.update_quantity(&ProductId::new("SKU-001"), 4);
        assert!(matches!(result, Err(CartError::OutOfStock { .. })));
        assert_eq!(
            cart.get_item(&ProductId::new("SKU-001"))
                .unwrap()
                .quantity
                .get(),
            2
        );
    }

    #[test]
    fn update_quantity_missing_item_fails() {
        let mut cart = cart();
        let result = cart.update_quantity(&ProductId::new("SKU-404"), 1);
        assert!(matches!(result, Err(CartError::ItemNotFound(_))));
    }

    #[test]
    fn remove_item_is_noop_when_absent() {
        let mut cart = cart();
        cart.add_item(&snapshot("SKU-001", Money::inr(500), 5), 1)
            .unwrap();
        cart.remove_item(&ProductId::new("SKU-404"));
        assert_eq!(cart.line_count(), 1);

        cart.remove_item(&ProductId::new("SKU-001"));
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_are_recomputed_from_line_items() {
        let mut cart = cart();
        cart.add_item(&snapshot("SKU-001", Money::inr(500), 5), 2)
            .unwrap();
        cart.add_item(&snapshot("SKU-002", Money::inr(300), 5), 1)
            .unwrap();

        let totals = cart.totals().unwrap();
        assert_eq!(totals.items_total, Money::inr(1300));
        assert_eq!(totals.item_count, 3);

        cart.update_quantity(&ProductId::new("SKU-001"), 1).unwrap();
        let totals = cart.totals().unwrap();
        assert_eq!(totals.items_total, Money::inr(800));
        assert_eq!(totals.item_count, 2);
    }

    #[test]
    fn totals_of_empty_cart_are_zero() {
        let totals = cart().totals().unwrap();
        assert!(totals.items_total.is_zero());
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn clear_empties_all_items() {
        let mut cart = cart();
        cart.add_item(&snapshot("SKU-001", Money::inr(500), 5), 2)
            .unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.totals().unwrap().items_total.is_zero());
    }

    #[test]
    fn serialization_roundtrip() {
        let mut cart = cart();
        cart.add_item(&snapshot("SKU-001", Money::inr(500), 5), 2)
            .unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(cart, back);
    }
}
