//! Payment and delivery status machines.
//!
//! Two independent sub-machines layered on one order, each one-directional
//! and terminal:
//!
//! ```text
//! PaymentStatus:   Unpaid ──► Paid
//! DeliveryStatus:  Pending ──► Delivered
//! ```

use serde::{Deserialize, Serialize};

/// Whether payment has been collected for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// Awaiting settlement (gateway capture, or cash at delivery).
    #[default]
    Unpaid,

    /// Payment settled (terminal state).
    Paid,
}

impl PaymentStatus {
    /// Returns true if payment has been settled.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    /// Returns true if a payment can still be recorded.
    pub fn can_record_payment(&self) -> bool {
        matches!(self, PaymentStatus::Unpaid)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Paid => "Paid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether an order has reached the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryStatus {
    /// Not yet delivered.
    #[default]
    Pending,

    /// Handed to the customer (terminal state).
    Delivered,
}

impl DeliveryStatus {
    /// Returns true if the order has been delivered.
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered)
    }

    /// Returns true if the delivery transition is still available.
    pub fn can_mark_delivered(&self) -> bool {
        matches!(self, DeliveryStatus::Pending)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
