//! Payment gateway collaborator trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::OrderId;
use domain::{Money, PaymentCapture};

use crate::error::FlowError;

/// Captures a payment through an external processor.
///
/// Only PayPal orders pass through here; cash-on-delivery settles at the
/// door. A failed or timed-out capture never marks an order paid.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Captures the given amount, returning the processor's transaction
    /// record.
    async fn capture(&self, order_id: OrderId, amount: Money) -> Result<PaymentCapture, FlowError>;
}

#[derive(Debug, Default)]
struct GatewayState {
    captures: HashMap<String, (OrderId, Money)>,
    next_id: u32,
    fail_on_capture: bool,
    capture_delay: Option<Duration>,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<GatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline the next capture calls.
    pub fn set_fail_on_capture(&self, fail: bool) {
        self.state.write().unwrap().fail_on_capture = fail;
    }

    /// Configures an artificial latency before each capture answers.
    pub fn set_capture_delay(&self, delay: Option<Duration>) {
        self.state.write().unwrap().capture_delay = delay;
    }

    /// Returns the number of successful captures.
    pub fn capture_count(&self) -> usize {
        self.state.read().unwrap().captures.len()
    }

    /// Returns true if a capture exists with the given transaction id.
    pub fn has_capture(&self, transaction_id: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .captures
            .contains_key(transaction_id)
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn capture(&self, order_id: OrderId, amount: Money) -> Result<PaymentCapture, FlowError> {
        let delay = self.state.read().unwrap().capture_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.write().unwrap();

        if state.fail_on_capture {
            return Err(FlowError::GatewayFailure {
                reason: "Payment declined".to_string(),
                retryable: true,
            });
        }

        state.next_id += 1;
        let transaction_id = format!("TXN-{:04}", state.next_id);
        state
            .captures
            .insert(transaction_id.clone(), (order_id, amount));

        Ok(PaymentCapture::new(
            transaction_id,
            "COMPLETED",
            "buyer@example.com",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn capture_returns_sequential_transactions() {
        let gateway = InMemoryPaymentGateway::new();
        let order_id = OrderId::new();

        let c1 = gateway.capture(order_id, Money::inr(1050)).await.unwrap();
        let c2 = gateway.capture(order_id, Money::inr(1050)).await.unwrap();

        assert_eq!(c1.transaction_id, "TXN-0001");
        assert_eq!(c2.transaction_id, "TXN-0002");
        assert_eq!(gateway.capture_count(), 2);
        assert!(gateway.has_capture("TXN-0001"));
    }

    #[tokio::test]
    async fn declined_capture_is_retryable() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_capture(true);

        let result = gateway.capture(OrderId::new(), Money::inr(1050)).await;
        assert!(matches!(
            result,
            Err(FlowError::GatewayFailure {
                retryable: true,
                ..
            })
        ));
        assert_eq!(gateway.capture_count(), 0);
    }

    #[tokio::test]
    async fn capture_delay_is_observable() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_capture_delay(Some(Duration::from_millis(20)));

        let start = std::time::Instant::now();
        gateway.capture(OrderId::new(), Money::inr(100)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
