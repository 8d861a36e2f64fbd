//! Checkout stage machine.

use serde::{Deserialize, Serialize};

/// The stage of a checkout in its walk to submission.
///
/// Stage transitions, strictly forward:
/// ```text
/// Empty ──► HasItems ──► AddressSet ──► PaymentMethodSet ──► Submitted
///   ▲           │
///   └───────────┘  (cart emptied)
/// ```
/// The only backward move is the cart emptying, which restarts the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutStage {
    /// No items in the cart yet.
    #[default]
    Empty,

    /// Cart has items; the shipping step is available.
    HasItems,

    /// Shipping address captured.
    AddressSet,

    /// Payment method chosen; submission is available.
    PaymentMethodSet,

    /// Order created (terminal state); a new checkout needs a fresh cart.
    Submitted,
}

impl CheckoutStage {
    /// Returns true if cart items can still be modified.
    pub fn can_modify_items(&self) -> bool {
        !matches!(self, CheckoutStage::Submitted)
    }

    /// Returns true if the shipping address can be set in this stage.
    pub fn can_set_address(&self) -> bool {
        matches!(
            self,
            CheckoutStage::HasItems | CheckoutStage::AddressSet | CheckoutStage::PaymentMethodSet
        )
    }

    /// Returns true if the payment method can be set in this stage.
    pub fn can_set_payment_method(&self) -> bool {
        matches!(
            self,
            CheckoutStage::AddressSet | CheckoutStage::PaymentMethodSet
        )
    }

    /// Returns true if the checkout can be submitted in this stage.
    pub fn can_submit(&self) -> bool {
        matches!(self, CheckoutStage::PaymentMethodSet)
    }

    /// Returns true if this is the terminal stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStage::Submitted)
    }

    /// Returns the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStage::Empty => "Empty",
            CheckoutStage::HasItems => "HasItems",
            CheckoutStage::AddressSet => "AddressSet",
            CheckoutStage::PaymentMethodSet => "PaymentMethodSet",
            CheckoutStage::Submitted => "Submitted",
        }
    }
}

impl std::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
