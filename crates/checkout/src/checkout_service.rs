//! Checkout service: walks the wizard steps and freezes the order.

use chrono::Utc;
use common::{OrderId, SessionId, UserId};
use domain::{Checkout, Order, PaymentMethod, PricingPolicy, ShippingAddress};
use store::{CartStore, OrderRepository};

use crate::error::Result;

/// Drives the checkout steps for a session and creates the order on
/// submission.
pub struct CheckoutService<CS, R>
where
    CS: CartStore,
    R: OrderRepository,
{
    cart_store: CS,
    orders: R,
    pricing: PricingPolicy,
}

impl<CS, R> CheckoutService<CS, R>
where
    CS: CartStore,
    R: OrderRepository,
{
    /// Creates a new checkout service with the storefront's pricing
    /// policy.
    pub fn new(cart_store: CS, orders: R, pricing: PricingPolicy) -> Self {
        Self {
            cart_store,
            orders,
            pricing,
        }
    }

    /// Captures the shipping address on the session's checkout context so
    /// it survives navigation.
    #[tracing::instrument(skip(self, address))]
    pub async fn set_shipping_address(
        &self,
        session_id: &SessionId,
        address: ShippingAddress,
    ) -> Result<Checkout> {
        let mut checkout = self.load_or_new(session_id).await?;
        checkout.set_shipping_address(address)?;
        self.cart_store.save(&checkout).await?;
        Ok(checkout)
    }

    /// Chooses the payment method.
    #[tracing::instrument(skip(self))]
    pub async fn set_payment_method(
        &self,
        session_id: &SessionId,
        method: PaymentMethod,
    ) -> Result<Checkout> {
        let mut checkout = self.load_or_new(session_id).await?;
        checkout.set_payment_method(method)?;
        self.cart_store.save(&checkout).await?;
        Ok(checkout)
    }

    /// Submits the checkout: prices the cart, freezes the order, creates
    /// it atomically, then clears the cart.
    ///
    /// The order insert happens before the cart is touched, so a failed
    /// or abandoned submission leaves the cart exactly as it was, with no
    /// partial side effects. A submission from the wrong stage fails with
    /// the domain's `InvalidTransition` and the caller redirects the user
    /// to the missing step.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self, session_id: &SessionId, user_id: UserId) -> Result<Order> {
        let mut checkout = self.load_or_new(session_id).await?;

        let draft = checkout.prepare_order(&self.pricing)?;
        let order = Order::create(OrderId::new(), user_id, draft, Utc::now())
            .map_err(crate::FlowError::Order)?;

        let order = self.orders.create(order).await?;

        checkout.complete_submission();

        // The submitted machine is terminal; the session gets a fresh
        // cart for its next checkout.
        self.cart_store
            .save(&Checkout::new(session_id.clone()))
            .await?;

        metrics::counter!("orders_submitted_total").increment(1);
        tracing::info!(
            order_id = %order.id(),
            total = %order.total_price(),
            method = %order.payment_method(),
            "order submitted"
        );

        Ok(order)
    }

    async fn load_or_new(&self, session_id: &SessionId) -> Result<Checkout> {
        let existing = self.cart_store.load(session_id).await?;
        Ok(existing.unwrap_or_else(|| Checkout::new(session_id.clone())))
    }
}
