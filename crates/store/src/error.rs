use common::OrderId;
use domain::OrderError;
use thiserror::Error;

/// Errors that can occur when interacting with the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order with the given id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// An order with this id already exists; creation is a single atomic
    /// insert and never overwrites.
    #[error("Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// A domain transition was rejected while applying a conditional
    /// update (e.g. payment already recorded).
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row held a value that no longer decodes into the domain.
    #[error("Invalid stored data: {0}")]
    Decode(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
