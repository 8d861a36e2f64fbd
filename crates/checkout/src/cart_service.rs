//! Cart service: the load/mutate/persist loop for a session's cart.

use common::{ProductId, SessionId};
use domain::Checkout;
use store::CartStore;

use crate::error::Result;
use crate::services::CatalogService;

/// Drives cart mutations for a session.
///
/// Each operation loads the session's checkout (creating a fresh one on
/// first use), applies the domain mutation, and saves the result back
/// through the cart store. The store's per-key atomic save is what keeps
/// overlapping tabs from losing updates; the service itself holds no
/// state.
pub struct CartService<CS, C>
where
    CS: CartStore,
    C: CatalogService,
{
    cart_store: CS,
    catalog: C,
}

impl<CS, C> CartService<CS, C>
where
    CS: CartStore,
    C: CatalogService,
{
    /// Creates a new cart service.
    pub fn new(cart_store: CS, catalog: C) -> Self {
        Self {
            cart_store,
            catalog,
        }
    }

    /// Loads the session's checkout, or a fresh empty one.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, session_id: &SessionId) -> Result<Checkout> {
        self.load_or_new(session_id).await
    }

    /// Adds a product to the session's cart, capturing the catalog
    /// snapshot at this moment.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        session_id: &SessionId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Checkout> {
        let snapshot = self.catalog.product_snapshot(product_id).await?;

        let mut checkout = self.load_or_new(session_id).await?;
        checkout.add_item(&snapshot, quantity)?;
        self.cart_store.save(&checkout).await?;

        tracing::info!(%session_id, %product_id, quantity, "item added to cart");
        Ok(checkout)
    }

    /// Sets the quantity of a line item, bounds-checked against the stock
    /// limit captured at add-time.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        session_id: &SessionId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Checkout> {
        let mut checkout = self.load_or_new(session_id).await?;
        checkout.update_quantity(product_id, quantity)?;
        self.cart_store.save(&checkout).await?;
        Ok(checkout)
    }

    /// Removes a line item; absent products are a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        session_id: &SessionId,
        product_id: &ProductId,
    ) -> Result<Checkout> {
        let mut checkout = self.load_or_new(session_id).await?;
        checkout.remove_item(product_id)?;
        self.cart_store.save(&checkout).await?;
        Ok(checkout)
    }

    async fn load_or_new(&self, session_id: &SessionId) -> Result<Checkout> {
        let existing = self.cart_store.load(session_id).await?;
        Ok(existing.unwrap_or_else(|| Checkout::new(session_id.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryCatalog;
    use domain::{CartError, CheckoutError, Money, ProductSnapshot};
    use store::InMemoryCartStore;

    fn snapshot(id: &str, price: Money, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image: format!("/images/{id}.jpg"),
            price,
            stock_limit: stock,
        }
    }

    fn service() -> CartService<InMemoryCartStore, InMemoryCatalog> {
        let catalog = InMemoryCatalog::new();
        catalog.insert(snapshot("SKU-001", Money::inr(500), 3));
        catalog.insert(snapshot("SKU-002", Money::inr(300), 5));
        CartService::new(InMemoryCartStore::new(), catalog)
    }

    #[tokio::test]
    async fn add_item_persists_across_loads() {
        let service = service();
        let session = SessionId::new("sess-1");

        service
            .add_item(&session, &ProductId::new("SKU-001"), 2)
            .await
            .unwrap();

        let checkout = service.get(&session).await.unwrap();
        assert_eq!(checkout.cart().line_count(), 1);
        assert_eq!(
            checkout.cart().totals().unwrap().items_total,
            Money::inr(1000)
        );
    }

    #[tokio::test]
    async fn add_unknown_product_fails() {
        let service = service();
        let session = SessionId::new("sess-1");

        let result = service
            .add_item(&session, &ProductId::new("SKU-404"), 1)
            .await;
        assert!(matches!(result, Err(crate::FlowError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn update_quantity_respects_captured_stock_limit() {
        let service = service();
        let session = SessionId::new("sess-1");
        service
            .add_item(&session, &ProductId::new("SKU-001"), 2)
            .await
            .unwrap();

        let result = service
            .update_quantity(&session, &ProductId::new("SKU-001"), 4)
            .await;
        assert!(matches!(
            result,
            Err(crate::FlowError::Checkout(CheckoutError::Cart(
                CartError::OutOfStock {
                    requested: 4,
                    stock_limit: 3
                }
            )))
        ));

        // Persisted cart unchanged.
        let checkout = service.get(&session).await.unwrap();
        assert_eq!(
            checkout
                .cart()
                .get_item(&ProductId::new("SKU-001"))
                .unwrap()
                .quantity
                .get(),
            2
        );
    }

    #[tokio::test]
    async fn remove_missing_item_is_noop() {
        let service = service();
        let session = SessionId::new("sess-1");
        service
            .add_item(&session, &ProductId::new("SKU-001"), 1)
            .await
            .unwrap();

        let checkout = service
            .remove_item(&session, &ProductId::new("SKU-404"))
            .await
            .unwrap();
        assert_eq!(checkout.cart().line_count(), 1);
    }
}
