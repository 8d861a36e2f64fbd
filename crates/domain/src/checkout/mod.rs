//! Checkout state machine and pricing rules.

mod machine;
mod pricing;
mod state;

pub use machine::{Checkout, OrderDraft};
pub use pricing::{PriceBreakdown, PricingPolicy};
pub use state::CheckoutStage;

use thiserror::Error;

use crate::cart::CartError;
use crate::money::MoneyError;
use crate::order::ValidationError;

/// Errors that can occur while walking the checkout steps.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The requested step is not available from the current stage. This is
    /// a recoverable user-flow error: the caller is redirected to the
    /// missing step, nothing in the system is at fault.
    #[error("Invalid transition: cannot {action} from {stage} stage")]
    InvalidTransition {
        stage: CheckoutStage,
        action: &'static str,
    },

    /// A required address field was empty.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A cart mutation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Money arithmetic failed while pricing the order.
    #[error(transparent)]
    Money(#[from] MoneyError),
}
