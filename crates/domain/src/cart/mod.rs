//! Cart aggregate and related types.

mod aggregate;
mod line_item;

pub use aggregate::{Cart, CartTotals};
pub use line_item::{LineItem, ProductSnapshot, Quantity};

use common::ProductId;
use thiserror::Error;

use crate::money::MoneyError;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is outside the stock bounds captured for the item.
    #[error("Out of stock: requested {requested}, limit {stock_limit} (minimum 1)")]
    OutOfStock { requested: u32, stock_limit: u32 },

    /// The product is not in the cart.
    #[error("Item not found in cart: {0}")]
    ItemNotFound(ProductId),

    /// Money arithmetic failed (mixed currencies).
    #[error(transparent)]
    Money(#[from] MoneyError),
}
