//! Route handlers and shared response types.

pub mod cart;
pub mod checkout;
pub mod health;
pub mod metrics;
pub mod orders;

use domain::{Checkout, LineItem, Money, Order, ShippingAddress};
use serde::Serialize;

use crate::error::ApiError;

// -- Shared response types --

#[derive(Serialize)]
pub struct MoneyResponse {
    pub amount: i64,
    pub currency: &'static str,
    pub formatted: String,
}

impl From<Money> for MoneyResponse {
    fn from(money: Money) -> Self {
        Self {
            amount: money.amount(),
            currency: money.currency().code(),
            formatted: money.format(),
        }
    }
}

#[derive(Serialize)]
pub struct LineItemResponse {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub unit_price: MoneyResponse,
    pub quantity: u32,
    pub stock_limit: u32,
    pub line_total: MoneyResponse,
}

impl From<&LineItem> for LineItemResponse {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            unit_price: item.unit_price.into(),
            quantity: item.quantity.get(),
            stock_limit: item.stock_limit,
            line_total: item.line_total().into(),
        }
    }
}

#[derive(Serialize)]
pub struct AddressResponse {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl From<&ShippingAddress> for AddressResponse {
    fn from(address: &ShippingAddress) -> Self {
        Self {
            address: address.address().to_string(),
            city: address.city().to_string(),
            postal_code: address.postal_code().to_string(),
            country: address.country().to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub stage: String,
    pub items: Vec<LineItemResponse>,
    pub items_total: MoneyResponse,
    pub item_count: u32,
    pub shipping_address: Option<AddressResponse>,
    pub payment_method: Option<String>,
}

impl CheckoutResponse {
    pub fn from_domain(checkout: &Checkout) -> Result<Self, ApiError> {
        let totals = checkout
            .cart()
            .totals()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(Self {
            stage: checkout.stage().to_string(),
            items: checkout.cart().items().iter().map(Into::into).collect(),
            items_total: totals.items_total.into(),
            item_count: totals.item_count,
            shipping_address: checkout.shipping_address().map(Into::into),
            payment_method: checkout.payment_method().map(|m| m.to_string()),
        })
    }
}

#[derive(Serialize)]
pub struct PaymentResultResponse {
    pub transaction_id: String,
    pub status: String,
    pub payer_email: String,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub items: Vec<LineItemResponse>,
    pub shipping_address: AddressResponse,
    pub payment_method: String,
    pub items_price: MoneyResponse,
    pub shipping_price: MoneyResponse,
    pub tax_price: MoneyResponse,
    pub total_price: MoneyResponse,
    pub payment_status: String,
    pub paid_at: Option<String>,
    pub payment_result: Option<PaymentResultResponse>,
    pub delivery_status: String,
    pub delivered_at: Option<String>,
    pub created_at: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            user_id: order.user_id().to_string(),
            items: order.items().iter().map(Into::into).collect(),
            shipping_address: order.shipping_address().into(),
            payment_method: order.payment_method().to_string(),
            items_price: order.items_price().into(),
            shipping_price: order.shipping_price().into(),
            tax_price: order.tax_price().into(),
            total_price: order.total_price().into(),
            payment_status: order.payment_status().to_string(),
            paid_at: order.paid_at().map(|t| t.to_rfc3339()),
            payment_result: order.payment_result().map(|r| PaymentResultResponse {
                transaction_id: r.transaction_id.clone(),
                status: r.status.clone(),
                payer_email: r.payer_email.clone(),
            }),
            delivery_status: order.delivery_status().to_string(),
            delivered_at: order.delivered_at().map(|t| t.to_rfc3339()),
            created_at: order.created_at().to_rfc3339(),
        }
    }
}
