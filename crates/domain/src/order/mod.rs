//! Order aggregate and related types.

mod aggregate;
mod status;
mod value_objects;

pub use aggregate::{Order, OrderRecord};
pub use status::{DeliveryStatus, PaymentStatus};
pub use value_objects::{PaymentCapture, PaymentMethod, ShippingAddress, ValidationError};

use thiserror::Error;

use crate::money::{Money, MoneyError};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order must freeze at least one line item.
    #[error("Order has no items")]
    NoItems,

    /// The stated items price does not match the frozen line totals.
    #[error("Items price {stated} does not match line totals {computed}")]
    ItemsPriceMismatch { stated: Money, computed: Money },

    /// The stated total does not equal items + shipping + tax.
    #[error("Total price {stated} does not match items + shipping + tax = {computed}")]
    TotalMismatch { stated: Money, computed: Money },

    /// Payment was already recorded; `paid_at` and the capture are set once.
    #[error("Payment already recorded for this order")]
    AlreadyPaid,

    /// The requested status transition is not available.
    #[error("Invalid transition: cannot {action} (payment {payment}, delivery {delivery})")]
    InvalidTransition {
        action: &'static str,
        payment: PaymentStatus,
        delivery: DeliveryStatus,
    },

    /// Money arithmetic failed while verifying totals.
    #[error(transparent)]
    Money(#[from] MoneyError),
}
