//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use super::{
    DeliveryStatus, OrderError, PaymentCapture, PaymentMethod, PaymentStatus, ShippingAddress,
};
use crate::cart::LineItem;
use crate::checkout::OrderDraft;
use crate::money::Money;

/// Order aggregate root.
///
/// The core fields (items, address, payment method, and the four audited
/// price fields) are frozen at submission time and never change. The
/// payment and delivery statuses are the only mutable layer, each moving
/// through its one-directional machine exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<LineItem>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,

    items_price: Money,
    shipping_price: Money,
    tax_price: Money,
    total_price: Money,

    payment_status: PaymentStatus,
    paid_at: Option<DateTime<Utc>>,
    payment_result: Option<PaymentCapture>,

    delivery_status: DeliveryStatus,
    delivered_at: Option<DateTime<Utc>>,

    created_at: DateTime<Utc>,
}

/// Raw order fields as read back from a store, prior to verification.
///
/// [`Order::from_record`] is the only way back into an `Order`, so every
/// load re-verifies the price invariants instead of trusting the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Money,
    pub shipping_price: Money,
    pub tax_price: Money,
    pub total_price: Money,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentCapture>,
    pub delivery_status: DeliveryStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates an order from a checkout draft.
    ///
    /// The draft's prices are asserted, not recomputed: an order is only
    /// created when `items_price` equals the frozen line totals and
    /// `total_price == items_price + shipping_price + tax_price` holds
    /// exactly.
    pub fn create(
        id: OrderId,
        user_id: UserId,
        draft: OrderDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        let order = Self {
            id,
            user_id,
            items: draft.items,
            shipping_address: draft.shipping_address,
            payment_method: draft.payment_method,
            items_price: draft.pricing.items_price,
            shipping_price: draft.pricing.shipping_price,
            tax_price: draft.pricing.tax_price,
            total_price: draft.pricing.total_price,
            payment_status: PaymentStatus::Unpaid,
            paid_at: None,
            payment_result: None,
            delivery_status: DeliveryStatus::Pending,
            delivered_at: None,
            created_at,
        };
        order.verify_totals()?;
        Ok(order)
    }

    /// Rebuilds an order from stored fields, re-verifying the price
    /// invariants.
    pub fn from_record(record: OrderRecord) -> Result<Self, OrderError> {
        let order = Self {
            id: record.id,
            user_id: record.user_id,
            items: record.items,
            shipping_address: record.shipping_address,
            payment_method: record.payment_method,
            items_price: record.items_price,
            shipping_price: record.shipping_price,
            tax_price: record.tax_price,
            total_price: record.total_price,
            payment_status: record.payment_status,
            paid_at: record.paid_at,
            payment_result: record.payment_result,
            delivery_status: record.delivery_status,
            delivered_at: record.delivered_at,
            created_at: record.created_at,
        };
        order.verify_totals()?;
        Ok(order)
    }

    /// Decomposes into raw fields for storage.
    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id,
            user_id: self.user_id,
            items: self.items.clone(),
            shipping_address: self.shipping_address.clone(),
            payment_method: self.payment_method,
            items_price: self.items_price,
            shipping_price: self.shipping_price,
            tax_price: self.tax_price,
            total_price: self.total_price,
            payment_status: self.payment_status,
            paid_at: self.paid_at,
            payment_result: self.payment_result.clone(),
            delivery_status: self.delivery_status,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
        }
    }

    /// Re-verifies (never recomputes) the audited price fields.
    pub fn verify_totals(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let currency = self.items_price.currency();
        let mut computed_items = Money::zero(currency);
        for item in &self.items {
            computed_items = computed_items.add(item.line_total())?;
        }
        if computed_items != self.items_price {
            return Err(OrderError::ItemsPriceMismatch {
                stated: self.items_price,
                computed: computed_items,
            });
        }

        let computed_total = self
            .items_price
            .add(self.shipping_price)?
            .add(self.tax_price)?;
        if computed_total != self.total_price {
            return Err(OrderError::TotalMismatch {
                stated: self.total_price,
                computed: computed_total,
            });
        }

        Ok(())
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn items_price(&self) -> Money {
        self.items_price
    }

    pub fn shipping_price(&self) -> Money {
        self.shipping_price
    }

    pub fn tax_price(&self) -> Money {
        self.tax_price
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    pub fn payment_result(&self) -> Option<&PaymentCapture> {
        self.payment_result.as_ref()
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        self.delivery_status
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Status transitions
impl Order {
    /// Records a settled payment capture.
    ///
    /// Fails with [`OrderError::AlreadyPaid`] once payment is settled;
    /// `paid_at` and the capture are set exactly once and a duplicate
    /// confirmation never overwrites them.
    pub fn record_payment(
        &mut self,
        capture: PaymentCapture,
        at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        if !self.payment_status.can_record_payment() {
            return Err(OrderError::AlreadyPaid);
        }

        self.payment_status = PaymentStatus::Paid;
        self.paid_at = Some(at);
        self.payment_result = Some(capture);
        Ok(())
    }

    /// Marks the order delivered.
    ///
    /// Delivery is reachable from `Paid`, or from `Unpaid` only for
    /// cash-on-delivery orders, where the cash handover settles payment at
    /// the same instant with no gateway capture recorded.
    /// A second delivery fails with `InvalidTransition` rather than being
    /// silently ignored, so double submissions surface.
    pub fn mark_delivered(&mut self, at: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.delivery_status.can_mark_delivered() {
            return Err(self.invalid_transition("mark delivered"));
        }

        if !self.payment_status.is_paid() {
            if !self.payment_method.is_cash_on_delivery() {
                return Err(self.invalid_transition("deliver before payment"));
            }
            self.payment_status = PaymentStatus::Paid;
            self.paid_at = Some(at);
        }

        self.delivery_status = DeliveryStatus::Delivered;
        self.delivered_at = Some(at);
        Ok(())
    }

    fn invalid_transition(&self, action: &'static str) -> OrderError {
        OrderError::InvalidTransition {
            action,
            payment: self.payment_status,
            delivery: self.delivery_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{ProductSnapshot, Quantity};
    use crate::checkout::PriceBreakdown;
    use common::ProductId;

    fn line_item(id: &str, price: Money, quantity: u32) -> LineItem {
        let snapshot = ProductSnapshot {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image: format!("/images/{id}.jpg"),
            price,
            stock_limit: 10,
        };
        LineItem::new(&snapshot, Quantity::new(quantity, 10).unwrap())
    }

    fn draft(method: PaymentMethod) -> OrderDraft {
        OrderDraft {
            items: vec![line_item("SKU-001", Money::inr(500), 2)],
            shipping_address: ShippingAddress::new("123 Test St", "Test City", "12345", "India")
                .unwrap(),
            payment_method: method,
            pricing: PriceBreakdown {
                items_price: Money::inr(1000),
                shipping_price: Money::inr(0),
                tax_price: Money::inr(50),
                total_price: Money::inr(1050),
            },
        }
    }

    fn order(method: PaymentMethod) -> Order {
        Order::create(OrderId::new(), UserId::new(), draft(method), Utc::now()).unwrap()
    }

    #[test]
    fn create_verifies_total_invariant() {
        let order = order(PaymentMethod::PayPal);
        assert_eq!(order.total_price(), Money::inr(1050));
        assert_eq!(order.payment_status(), PaymentStatus::Unpaid);
        assert_eq!(order.delivery_status(), DeliveryStatus::Pending);
    }

    #[test]
    fn create_rejects_total_mismatch() {
        let mut d = draft(PaymentMethod::PayPal);
        d.pricing.total_price = Money::inr(1100);
        let result = Order::create(OrderId::new(), UserId::new(), d, Utc::now());
        assert!(matches!(result, Err(OrderError::TotalMismatch { .. })));
    }

    #[test]
    fn create_rejects_items_price_mismatch() {
        let mut d = draft(PaymentMethod::PayPal);
        d.pricing.items_price = Money::inr(900);
        d.pricing.total_price = Money::inr(950);
        let result = Order::create(OrderId::new(), UserId::new(), d, Utc::now());
        assert!(matches!(result, Err(OrderError::ItemsPriceMismatch { .. })));
    }

    #[test]
    fn create_rejects_empty_items() {
        let mut d = draft(PaymentMethod::PayPal);
        d.items.clear();
        let result = Order::create(OrderId::new(), UserId::new(), d, Utc::now());
        assert!(matches!(result, Err(OrderError::NoItems)));
    }

    #[test]
    fn record_payment_sets_fields_once() {
        let mut order = order(PaymentMethod::PayPal);
        let at = Utc::now();
        order
            .record_payment(PaymentCapture::new("TXN-1", "COMPLETED", "a@b.com"), at)
            .unwrap();

        assert!(order.payment_status().is_paid());
        assert_eq!(order.paid_at(), Some(at));
        assert_eq!(order.payment_result().unwrap().transaction_id, "TXN-1");
    }

    #[test]
    fn record_payment_twice_preserves_original_capture() {
        let mut order = order(PaymentMethod::PayPal);
        let first = Utc::now();
        order
            .record_payment(PaymentCapture::new("TXN-1", "COMPLETED", "a@b.com"), first)
            .unwrap();

        let result =
            order.record_payment(PaymentCapture::new("TXN-2", "COMPLETED", "a@b.com"), Utc::now());
        assert!(matches!(result, Err(OrderError::AlreadyPaid)));
        assert_eq!(order.payment_result().unwrap().transaction_id, "TXN-1");
        assert_eq!(order.paid_at(), Some(first));
    }

    #[test]
    fn paid_order_can_be_delivered() {
        let mut order = order(PaymentMethod::PayPal);
        order
            .record_payment(PaymentCapture::new("TXN-1", "COMPLETED", "a@b.com"), Utc::now())
            .unwrap();

        order.mark_delivered(Utc::now()).unwrap();
        assert!(order.delivery_status().is_delivered());
        assert!(order.delivered_at().is_some());
    }

    #[test]
    fn unpaid_paypal_order_cannot_be_delivered() {
        let mut order = order(PaymentMethod::PayPal);
        let result = order.mark_delivered(Utc::now());
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                action: "deliver before payment",
                ..
            })
        ));
        assert!(!order.delivery_status().is_delivered());
    }

    #[test]
    fn unpaid_cod_order_delivery_settles_payment() {
        let mut order = order(PaymentMethod::CashOnDelivery);
        let at = Utc::now();
        order.mark_delivered(at).unwrap();

        assert!(order.delivery_status().is_delivered());
        assert!(order.payment_status().is_paid());
        assert_eq!(order.paid_at(), Some(at));
        assert!(order.payment_result().is_none(), "no gateway capture for cash");
    }

    #[test]
    fn double_delivery_is_rejected() {
        let mut order = order(PaymentMethod::CashOnDelivery);
        order.mark_delivered(Utc::now()).unwrap();

        let result = order.mark_delivered(Utc::now());
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                action: "mark delivered",
                ..
            })
        ));
    }

    #[test]
    fn from_record_re_verifies_invariants() {
        let order = order(PaymentMethod::PayPal);
        let mut record = order.to_record();
        assert!(Order::from_record(record.clone()).is_ok());

        record.total_price = Money::inr(9999);
        assert!(matches!(
            Order::from_record(record),
            Err(OrderError::TotalMismatch { .. })
        ));
    }

    #[test]
    fn serialization_roundtrip() {
        let order = order(PaymentMethod::PayPal);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
