//! Checkout aggregate implementation.

use common::{ProductId, SessionId};
use serde::{Deserialize, Serialize};

use super::{CheckoutError, CheckoutStage, PriceBreakdown, PricingPolicy};
use crate::cart::{Cart, LineItem, ProductSnapshot};
use crate::order::{PaymentMethod, ShippingAddress};

/// Everything needed to freeze an order out of a checkout: the cart's
/// line items, the captured address and method, and the priced totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub pricing: PriceBreakdown,
}

/// Checkout aggregate root.
///
/// Owns the session's cart plus the checkout context (address, payment
/// method) so the context survives navigation and restarts; the cart
/// store persists this whole aggregate per session key. Cart mutations
/// route through here so the stage is kept honest: emptying the cart
/// restarts the walk at `Empty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    cart: Cart,
    shipping_address: Option<ShippingAddress>,
    payment_method: Option<PaymentMethod>,
    stage: CheckoutStage,
}

impl Checkout {
    /// Creates a fresh checkout with an empty cart for a session.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            cart: Cart::new(session_id),
            shipping_address: None,
            payment_method: None,
            stage: CheckoutStage::Empty,
        }
    }

    /// Returns the session's cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Returns the current stage.
    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Returns the captured shipping address, if any.
    pub fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.shipping_address.as_ref()
    }

    /// Returns the chosen payment method, if any.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Adds a product to the cart (see [`Cart::add_item`]).
    pub fn add_item(
        &mut self,
        snapshot: &ProductSnapshot,
        quantity: u32,
    ) -> Result<(), CheckoutError> {
        self.ensure_items_mutable("add item")?;
        self.cart.add_item(snapshot, quantity)?;
        self.refresh_stage();
        Ok(())
    }

    /// Sets the quantity of an existing line item.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), CheckoutError> {
        self.ensure_items_mutable("update quantity")?;
        self.cart.update_quantity(product_id, quantity)?;
        Ok(())
    }

    /// Removes a line item; emptying the cart restarts the walk.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<(), CheckoutError> {
        self.ensure_items_mutable("remove item")?;
        self.cart.remove_item(product_id);
        self.refresh_stage();
        Ok(())
    }

    /// Captures the shipping address and advances past the shipping step.
    ///
    /// Re-entering the step to change the address is allowed; the stage
    /// never moves backward for it.
    pub fn set_shipping_address(&mut self, address: ShippingAddress) -> Result<(), CheckoutError> {
        if !self.stage.can_set_address() {
            return Err(self.invalid("set shipping address"));
        }
        self.shipping_address = Some(address);
        if self.stage == CheckoutStage::HasItems {
            self.stage = CheckoutStage::AddressSet;
        }
        Ok(())
    }

    /// Chooses the payment method and advances past the payment step.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        if !self.stage.can_set_payment_method() {
            return Err(self.invalid("set payment method"));
        }
        self.payment_method = Some(method);
        self.stage = CheckoutStage::PaymentMethodSet;
        Ok(())
    }

    /// Prices the cart and freezes an order draft, without mutating the
    /// checkout.
    ///
    /// The split between this and [`complete_submission`] lets the caller
    /// create the order first and clear the cart only once the create has
    /// succeeded, so an abandoned or failed submission leaves no side
    /// effects.
    ///
    /// [`complete_submission`]: Checkout::complete_submission
    pub fn prepare_order(&self, policy: &PricingPolicy) -> Result<OrderDraft, CheckoutError> {
        if !self.stage.can_submit() || self.cart.is_empty() {
            return Err(self.invalid("submit order"));
        }

        let shipping_address = self
            .shipping_address
            .clone()
            .ok_or_else(|| self.invalid("submit order"))?;
        let payment_method = self
            .payment_method
            .ok_or_else(|| self.invalid("submit order"))?;

        let totals = self.cart.totals()?;
        let pricing = policy.quote(totals.items_total)?;

        Ok(OrderDraft {
            items: self.cart.items().to_vec(),
            shipping_address,
            payment_method,
            pricing,
        })
    }

    /// Clears the cart and moves to the terminal stage after the order has
    /// been created.
    pub fn complete_submission(&mut self) {
        self.cart.clear();
        self.stage = CheckoutStage::Submitted;
    }

    fn ensure_items_mutable(&self, action: &'static str) -> Result<(), CheckoutError> {
        if !self.stage.can_modify_items() {
            return Err(self.invalid(action));
        }
        Ok(())
    }

    fn refresh_stage(&mut self) {
        if self.cart.is_empty() {
            self.stage = CheckoutStage::Empty;
        } else if self.stage == CheckoutStage::Empty {
            self.stage = CheckoutStage::HasItems;
        }
    }

    fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            stage: self.stage,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn snapshot(id: &str, price: Money, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image: format!("/images/{id}.jpg"),
            price,
            stock_limit: stock,
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress::new("123 Test St", "Test City", "12345", "India").unwrap()
    }

    fn checkout_with_item() -> Checkout {
        let mut checkout = Checkout::new(SessionId::new("sess-1"));
        checkout
            .add_item(&snapshot("SKU-001", Money::inr(500), 5), 2)
            .unwrap();
        checkout
    }

    #[test]
    fn adding_first_item_enters_has_items() {
        let checkout = checkout_with_item();
        assert_eq!(checkout.stage(), CheckoutStage::HasItems);
    }

    #[test]
    fn emptying_cart_restarts_at_empty() {
        let mut checkout = checkout_with_item();
        checkout.set_shipping_address(address()).unwrap();
        assert_eq!(checkout.stage(), CheckoutStage::AddressSet);

        checkout.remove_item(&ProductId::new("SKU-001")).unwrap();
        assert_eq!(checkout.stage(), CheckoutStage::Empty);

        // Context is retained as data, but the walk restarts.
        assert!(checkout.shipping_address().is_some());
        checkout
            .add_item(&snapshot("SKU-001", Money::inr(500), 5), 1)
            .unwrap();
        assert_eq!(checkout.stage(), CheckoutStage::HasItems);
    }

    #[test]
    fn address_step_requires_items() {
        let mut checkout = Checkout::new(SessionId::new("sess-1"));
        let result = checkout.set_shipping_address(address());
        assert!(matches!(
            result,
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn payment_step_requires_address() {
        let mut checkout = checkout_with_item();
        let result = checkout.set_payment_method(PaymentMethod::PayPal);
        assert!(matches!(
            result,
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn full_walk_reaches_payment_method_set() {
        let mut checkout = checkout_with_item();
        checkout.set_shipping_address(address()).unwrap();
        checkout.set_payment_method(PaymentMethod::PayPal).unwrap();
        assert_eq!(checkout.stage(), CheckoutStage::PaymentMethodSet);
    }

    #[test]
    fn changing_address_later_does_not_regress_stage() {
        let mut checkout = checkout_with_item();
        checkout.set_shipping_address(address()).unwrap();
        checkout.set_payment_method(PaymentMethod::PayPal).unwrap();

        let other = ShippingAddress::new("9 Other Rd", "Elsewhere", "99999", "India").unwrap();
        checkout.set_shipping_address(other).unwrap();
        assert_eq!(checkout.stage(), CheckoutStage::PaymentMethodSet);
    }

    #[test]
    fn prepare_order_prices_the_cart() {
        let mut checkout = checkout_with_item();
        checkout.set_shipping_address(address()).unwrap();
        checkout
            .set_payment_method(PaymentMethod::CashOnDelivery)
            .unwrap();

        let draft = checkout.prepare_order(&PricingPolicy::default()).unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.pricing.items_price, Money::inr(1000));
        assert_eq!(draft.pricing.shipping_price, Money::inr(0));
        assert_eq!(draft.pricing.tax_price, Money::inr(50));
        assert_eq!(draft.pricing.total_price, Money::inr(1050));
    }

    #[test]
    fn prepare_order_requires_payment_method_stage() {
        let mut checkout = checkout_with_item();
        checkout.set_shipping_address(address()).unwrap();

        let result = checkout.prepare_order(&PricingPolicy::default());
        assert!(matches!(
            result,
            Err(CheckoutError::InvalidTransition {
                action: "submit order",
                ..
            })
        ));
    }

    #[test]
    fn complete_submission_clears_cart_and_terminates() {
        let mut checkout = checkout_with_item();
        checkout.set_shipping_address(address()).unwrap();
        checkout.set_payment_method(PaymentMethod::PayPal).unwrap();
        checkout.prepare_order(&PricingPolicy::default()).unwrap();

        checkout.complete_submission();
        assert!(checkout.cart().is_empty());
        assert_eq!(checkout.stage(), CheckoutStage::Submitted);

        // Terminal: no further mutations.
        let result = checkout.add_item(&snapshot("SKU-002", Money::inr(100), 5), 1);
        assert!(matches!(
            result,
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn out_of_stock_leaves_checkout_unchanged() {
        let mut checkout = checkout_with_item();
        let before = checkout.clone();

        let result = checkout.update_quantity(&ProductId::new("SKU-001"), 6);
        assert!(matches!(
            result,
            Err(CheckoutError::Cart(crate::cart::CartError::OutOfStock { .. }))
        ));
        assert_eq!(checkout, before);
    }

    #[test]
    fn serialization_roundtrip() {
        let mut checkout = checkout_with_item();
        checkout.set_shipping_address(address()).unwrap();

        let json = serde_json::to_string(&checkout).unwrap();
        let back: Checkout = serde_json::from_str(&json).unwrap();
        assert_eq!(checkout, back);
    }
}
