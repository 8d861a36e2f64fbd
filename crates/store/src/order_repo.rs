//! Order persistence collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::{Order, PaymentCapture};
use tokio::sync::RwLock;

use crate::{Result, StoreError};

/// Repository for order aggregates.
///
/// `create` is a single atomic insert: no partially-written order is ever
/// observable and an existing id is never overwritten. The status
/// transitions (`mark_paid`, `mark_delivered`) run the domain transition
/// inside a per-order mutual-exclusion scope (test-Unpaid-then-set-Paid
/// as one step), so a duplicate gateway callback racing a concurrent
/// admin action cannot double-settle. Implementations never re-implement
/// the transition rules; they only provide the exclusion scope.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order atomically.
    async fn create(&self, order: Order) -> Result<Order>;

    /// Loads an order by id.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Loads a customer's orders, newest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Applies the payment transition under the per-order lock.
    ///
    /// Fails with `OrderNotFound` for an unknown id and with the domain's
    /// `AlreadyPaid` when payment was settled before the lock was taken.
    async fn mark_paid(
        &self,
        id: OrderId,
        capture: PaymentCapture,
        at: DateTime<Utc>,
    ) -> Result<Order>;

    /// Applies the delivery transition under the per-order lock.
    async fn mark_delivered(&self, id: OrderId, at: DateTime<Utc>) -> Result<Order>;
}

/// In-memory order repository for testing.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(StoreError::DuplicateOrder(order.id()));
        }
        orders.insert(order.id(), order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(result)
    }

    async fn mark_paid(
        &self,
        id: OrderId,
        capture: PaymentCapture,
        at: DateTime<Utc>,
    ) -> Result<Order> {
        // The write lock is the exclusion scope: the Unpaid check and the
        // Paid write in record_payment are one step under it.
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::OrderNotFound(id))?;
        order.record_payment(capture, at)?;
        Ok(order.clone())
    }

    async fn mark_delivered(&self, id: OrderId, at: DateTime<Utc>) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::OrderNotFound(id))?;
        order.mark_delivered(at)?;
        Ok(order.clone())
    }
}
