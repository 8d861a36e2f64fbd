//! Line items and their bounded quantities.

use common::ProductId;
use serde::{Deserialize, Serialize};

use super::CartError;
use crate::money::Money;

/// A bounded positive line quantity.
///
/// Quantities live in `1..=stock_limit`, where the limit is the stock
/// level captured when the product snapshot was taken. Dropping a line to
/// zero is done by removing it, not by a zero quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Creates a quantity, bounds-checked against the captured stock limit.
    pub fn new(value: u32, stock_limit: u32) -> Result<Self, CartError> {
        if value < 1 || value > stock_limit {
            return Err(CartError::OutOfStock {
                requested: value,
                stock_limit,
            });
        }
        Ok(Self(value))
    }

    /// Returns the raw quantity.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Increments, failing with `OutOfStock` at the captured limit.
    pub fn increment(self, stock_limit: u32) -> Result<Self, CartError> {
        Self::new(self.0 + 1, stock_limit)
    }

    /// Decrements, failing with `OutOfStock` below 1.
    pub fn decrement(self, stock_limit: u32) -> Result<Self, CartError> {
        if self.0 <= 1 {
            return Err(CartError::OutOfStock {
                requested: self.0 - 1,
                stock_limit,
            });
        }
        Ok(Self(self.0 - 1))
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Product data as supplied by the catalog collaborator.
///
/// The cart captures these values at add-time; it never holds a live
/// reference to the catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub price: Money,
    pub stock_limit: u32,
}

/// An item within a cart or a frozen order.
///
/// Owned exclusively by one cart or one order, never shared. The unit
/// price and stock limit are the values captured when the item was added
/// or last refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub stock_limit: u32,
}

impl LineItem {
    /// Creates a line item from a catalog snapshot and a validated quantity.
    pub fn new(snapshot: &ProductSnapshot, quantity: Quantity) -> Self {
        Self {
            product_id: snapshot.product_id.clone(),
            name: snapshot.name.clone(),
            image: snapshot.image.clone(),
            unit_price: snapshot.price,
            quantity,
            stock_limit: snapshot.stock_limit,
        }
    }

    /// Returns the line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity.get())
    }
}
