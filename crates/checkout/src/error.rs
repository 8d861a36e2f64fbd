//! Service-layer error types.

use common::{OrderId, ProductId};
use domain::{CheckoutError, OrderError};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur while driving the cart-to-order flow.
///
/// User-flow errors (`Checkout`, `Order` transitions) are recoverable and
/// surfaced verbatim; not-found errors are surfaced and never retried;
/// gateway failures are retryable by the caller and never mark an order
/// paid.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The catalog has no such product.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// No order with the given id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A checkout step was rejected (wrong stage, out of stock, invalid
    /// address).
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// An order invariant or status transition was rejected.
    #[error(transparent)]
    Order(OrderError),

    /// The gateway refused or failed the capture.
    #[error("Payment gateway failure: {reason}")]
    GatewayFailure { reason: String, retryable: bool },

    /// The gateway did not answer within the configured bound. The
    /// capture is treated as failed and retryable; the order is not paid.
    #[error("Payment gateway timed out after {timeout_ms} ms")]
    GatewayTimeout { timeout_ms: u64 },

    /// The acting user lacks fulfillment authority.
    #[error("Actor lacks fulfillment authority")]
    Unauthorized,

    /// Cash-on-delivery orders are settled at the door, not captured.
    #[error("Order {0} is cash-on-delivery; there is nothing to capture")]
    NothingToCapture(OrderId),

    /// A store operation failed.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for FlowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OrderNotFound(id) => FlowError::OrderNotFound(id),
            StoreError::Order(e) => FlowError::Order(e),
            other => FlowError::Store(other),
        }
    }
}

/// Convenience type alias for flow results.
pub type Result<T> = std::result::Result<T, FlowError>;
