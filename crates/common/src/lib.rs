//! Shared identifier types for the storefront order engine.

pub mod types;

pub use types::{OrderId, ProductId, SessionId, UserId};
