//! Value objects shared by checkout and orders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A required field was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} must not be empty")]
pub struct ValidationError {
    pub field: &'static str,
}

/// A delivery address. All four fields are required and non-empty; no
/// further format validation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    address: String,
    city: String,
    postal_code: String,
    country: String,
}

impl ShippingAddress {
    /// Creates an address, rejecting blank fields.
    pub fn new(
        address: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let address = address.into();
        let city = city.into();
        let postal_code = postal_code.into();
        let country = country.into();

        for (field, value) in [
            ("address", &address),
            ("city", &city),
            ("postal code", &postal_code),
            ("country", &country),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError { field });
            }
        }

        Ok(Self {
            address,
            city,
            postal_code,
            country,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

impl std::fmt::Display for ShippingAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {} - {}, {}",
            self.address, self.city, self.postal_code, self.country
        )
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Captured electronically through the payment gateway.
    PayPal,
    /// Cash collected at the door; settled by the delivery transition.
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn is_cash_on_delivery(&self) -> bool {
        matches!(self, PaymentMethod::CashOnDelivery)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::CashOnDelivery => "CashOnDelivery",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque result of a successful gateway capture, recorded on the order
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCapture {
    pub transaction_id: String,
    pub status: String,
    pub payer_email: String,
}

impl PaymentCapture {
    pub fn new(
        transaction_id: impl Into<String>,
        status: impl Into<String>,
        payer_email: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            status: status.into(),
            payer_email: payer_email.into(),
        }
    }
}
