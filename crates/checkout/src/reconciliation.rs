//! Payment reconciliation: one external confirmation, one transition.

use std::time::Duration;

use chrono::Utc;
use common::OrderId;
use domain::{Order, OrderError, PaymentCapture};
use store::{OrderRepository, StoreError};

use crate::error::{FlowError, Result};
use crate::services::{Actor, FulfillmentAuthorizer, PaymentGateway};

/// Default bound on the external gateway capture call.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bridges external payment confirmations and delivery actions onto the
/// order's status machines, at most once each.
pub struct ReconciliationService<R, G, A>
where
    R: OrderRepository,
    G: PaymentGateway,
    A: FulfillmentAuthorizer,
{
    orders: R,
    gateway: G,
    authorizer: A,
    capture_timeout: Duration,
}

impl<R, G, A> ReconciliationService<R, G, A>
where
    R: OrderRepository,
    G: PaymentGateway,
    A: FulfillmentAuthorizer,
{
    /// Creates a new reconciliation service with the default capture
    /// timeout.
    pub fn new(orders: R, gateway: G, authorizer: A) -> Self {
        Self {
            orders,
            gateway,
            authorizer,
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }

    /// Overrides the gateway capture timeout.
    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }

    /// Records an external payment confirmation against the order.
    ///
    /// The repository applies the transition as an atomic
    /// test-Unpaid-then-set-Paid, which closes the race between a
    /// duplicate gateway callback and a concurrent admin action. A
    /// duplicate confirmation is logged and swallowed as a success no-op:
    /// the caller's intent (payment confirmed) is already satisfied, and
    /// the stored order comes back with its original capture untouched.
    #[tracing::instrument(skip(self, capture))]
    pub async fn record_payment(
        &self,
        order_id: OrderId,
        capture: PaymentCapture,
    ) -> Result<Order> {
        match self.orders.mark_paid(order_id, capture, Utc::now()).await {
            Ok(order) => {
                metrics::counter!("payments_recorded_total").increment(1);
                tracing::info!(%order_id, "payment recorded");
                Ok(order)
            }
            Err(StoreError::Order(OrderError::AlreadyPaid)) => {
                metrics::counter!("payment_duplicate_confirmations_total").increment(1);
                tracing::warn!(%order_id, "duplicate payment confirmation ignored");
                let order = self
                    .orders
                    .find_by_id(order_id)
                    .await?
                    .ok_or(FlowError::OrderNotFound(order_id))?;
                Ok(order)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Drives a gateway capture for a PayPal order and records the result.
    ///
    /// Cash-on-delivery orders never pass through this path. The capture
    /// call is bounded by the configured timeout; on timeout or gateway
    /// failure the error is retryable and the order remains unpaid. An
    /// order is never marked paid without an explicit successful
    /// confirmation.
    #[tracing::instrument(skip(self))]
    pub async fn capture_payment(&self, order_id: OrderId) -> Result<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(FlowError::OrderNotFound(order_id))?;

        if order.payment_method().is_cash_on_delivery() {
            return Err(FlowError::NothingToCapture(order_id));
        }

        if order.payment_status().is_paid() {
            // Double-click on "pay": the first capture already settled.
            metrics::counter!("payment_duplicate_confirmations_total").increment(1);
            tracing::warn!(%order_id, "capture requested for an already-paid order");
            return Ok(order);
        }

        let amount = order.total_price();
        let capture =
            match tokio::time::timeout(self.capture_timeout, self.gateway.capture(order_id, amount))
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(%order_id, "gateway capture timed out");
                    return Err(FlowError::GatewayTimeout {
                        timeout_ms: self.capture_timeout.as_millis() as u64,
                    });
                }
            };

        self.record_payment(order_id, capture).await
    }

    /// Marks an order delivered on behalf of a fulfillment actor.
    ///
    /// The delivery transition itself (payment-before-delivery for
    /// non-COD, settle-on-delivery for COD, idempotent-reject on a second
    /// delivery) lives in the order aggregate and runs under the
    /// repository's per-order lock.
    #[tracing::instrument(skip(self))]
    pub async fn mark_delivered(&self, order_id: OrderId, actor: &Actor) -> Result<Order> {
        self.authorizer.authorize_fulfillment(actor).await?;

        let order = self.orders.mark_delivered(order_id, Utc::now()).await?;

        metrics::counter!("orders_delivered_total").increment(1);
        tracing::info!(%order_id, actor = %actor.user_id, "order delivered");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{AdminAuthorizer, InMemoryPaymentGateway};
    use common::{ProductId, SessionId, UserId};
    use domain::{
        Checkout, Money, PaymentMethod, PricingPolicy, ProductSnapshot, ShippingAddress,
    };
    use store::InMemoryOrderRepository;

    fn build_order(method: PaymentMethod) -> Order {
        let mut checkout = Checkout::new(SessionId::new("sess-1"));
        checkout
            .add_item(
                &ProductSnapshot {
                    product_id: ProductId::new("SKU-001"),
                    name: "Widget".to_string(),
                    image: "/images/widget.jpg".to_string(),
                    price: Money::inr(500),
                    stock_limit: 5,
                },
                2,
            )
            .unwrap();
        checkout
            .set_shipping_address(
                ShippingAddress::new("123 Test St", "Test City", "12345", "India").unwrap(),
            )
            .unwrap();
        checkout.set_payment_method(method).unwrap();
        let draft = checkout.prepare_order(&PricingPolicy::default()).unwrap();
        Order::create(OrderId::new(), UserId::new(), draft, Utc::now()).unwrap()
    }

    fn service(
        orders: InMemoryOrderRepository,
        gateway: InMemoryPaymentGateway,
    ) -> ReconciliationService<InMemoryOrderRepository, InMemoryPaymentGateway, AdminAuthorizer> {
        ReconciliationService::new(orders, gateway, AdminAuthorizer::new())
    }

    #[tokio::test]
    async fn capture_settles_paypal_order() {
        let orders = InMemoryOrderRepository::new();
        let gateway = InMemoryPaymentGateway::new();
        let order = build_order(PaymentMethod::PayPal);
        let id = order.id();
        orders.create(order).await.unwrap();

        let service = service(orders, gateway.clone());
        let paid = service.capture_payment(id).await.unwrap();

        assert!(paid.payment_status().is_paid());
        assert_eq!(paid.payment_result().unwrap().transaction_id, "TXN-0001");
        assert_eq!(gateway.capture_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_callback_returns_original_capture() {
        let orders = InMemoryOrderRepository::new();
        let order = build_order(PaymentMethod::PayPal);
        let id = order.id();
        orders.create(order).await.unwrap();

        let service = service(orders, InMemoryPaymentGateway::new());
        let first = service
            .record_payment(id, PaymentCapture::new("TXN-A", "COMPLETED", "a@b.com"))
            .await
            .unwrap();

        let second = service
            .record_payment(id, PaymentCapture::new("TXN-B", "COMPLETED", "a@b.com"))
            .await
            .unwrap();

        assert_eq!(second.payment_result().unwrap().transaction_id, "TXN-A");
        assert_eq!(second.paid_at(), first.paid_at());
    }

    #[tokio::test]
    async fn capture_for_unknown_order_fails() {
        let service = service(InMemoryOrderRepository::new(), InMemoryPaymentGateway::new());
        let result = service.capture_payment(OrderId::new()).await;
        assert!(matches!(result, Err(FlowError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn cod_orders_never_pass_through_capture() {
        let orders = InMemoryOrderRepository::new();
        let order = build_order(PaymentMethod::CashOnDelivery);
        let id = order.id();
        orders.create(order).await.unwrap();

        let service = service(orders, InMemoryPaymentGateway::new());
        let result = service.capture_payment(id).await;
        assert!(matches!(result, Err(FlowError::NothingToCapture(_))));
    }

    #[tokio::test]
    async fn declined_capture_leaves_order_unpaid() {
        let orders = InMemoryOrderRepository::new();
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_capture(true);
        let order = build_order(PaymentMethod::PayPal);
        let id = order.id();
        orders.create(order).await.unwrap();

        let service = service(orders.clone(), gateway);
        let result = service.capture_payment(id).await;
        assert!(matches!(
            result,
            Err(FlowError::GatewayFailure {
                retryable: true,
                ..
            })
        ));

        let stored = orders.find_by_id(id).await.unwrap().unwrap();
        assert!(!stored.payment_status().is_paid());
    }

    #[tokio::test]
    async fn slow_gateway_times_out_without_paying() {
        let orders = InMemoryOrderRepository::new();
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_capture_delay(Some(Duration::from_millis(100)));
        let order = build_order(PaymentMethod::PayPal);
        let id = order.id();
        orders.create(order).await.unwrap();

        let service = service(orders.clone(), gateway)
            .with_capture_timeout(Duration::from_millis(10));
        let result = service.capture_payment(id).await;
        assert!(matches!(result, Err(FlowError::GatewayTimeout { .. })));

        let stored = orders.find_by_id(id).await.unwrap().unwrap();
        assert!(!stored.payment_status().is_paid());
    }

    #[tokio::test]
    async fn delivery_requires_fulfillment_authority() {
        let orders = InMemoryOrderRepository::new();
        let order = build_order(PaymentMethod::CashOnDelivery);
        let id = order.id();
        orders.create(order).await.unwrap();

        let service = service(orders, InMemoryPaymentGateway::new());
        let result = service
            .mark_delivered(id, &Actor::customer(UserId::new()))
            .await;
        assert!(matches!(result, Err(FlowError::Unauthorized)));

        let delivered = service
            .mark_delivered(id, &Actor::admin(UserId::new()))
            .await
            .unwrap();
        assert!(delivered.delivery_status().is_delivered());
    }

    #[tokio::test]
    async fn double_delivery_surfaces_invalid_transition() {
        let orders = InMemoryOrderRepository::new();
        let order = build_order(PaymentMethod::CashOnDelivery);
        let id = order.id();
        orders.create(order).await.unwrap();

        let service = service(orders, InMemoryPaymentGateway::new());
        let admin = Actor::admin(UserId::new());
        service.mark_delivered(id, &admin).await.unwrap();

        let result = service.mark_delivered(id, &admin).await;
        assert!(matches!(
            result,
            Err(FlowError::Order(OrderError::InvalidTransition { .. }))
        ));
    }
}
