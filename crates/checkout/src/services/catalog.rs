//! Catalog collaborator trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ProductId;
use domain::ProductSnapshot;

use crate::error::FlowError;

/// Supplies product snapshots used to populate line items.
///
/// The core captures the snapshot's price and stock limit at add-time and
/// never trusts a live catalog price at checkout.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Looks up the current snapshot for a product.
    async fn product_snapshot(&self, product_id: &ProductId)
    -> Result<ProductSnapshot, FlowError>;
}

/// In-memory catalog for testing and development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, ProductSnapshot>>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product snapshot.
    pub fn insert(&self, snapshot: ProductSnapshot) {
        self.products
            .write()
            .unwrap()
            .insert(snapshot.product_id.clone(), snapshot);
    }

    /// Returns the number of products.
    pub fn product_count(&self) -> usize {
        self.products.read().unwrap().len()
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn product_snapshot(
        &self,
        product_id: &ProductId,
    ) -> Result<ProductSnapshot, FlowError> {
        self.products
            .read()
            .unwrap()
            .get(product_id)
            .cloned()
            .ok_or_else(|| FlowError::ProductNotFound(product_id.clone()))
    }
}
