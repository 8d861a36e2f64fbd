//! External collaborator traits and in-memory implementations.

pub mod authorizer;
pub mod catalog;
pub mod gateway;

pub use authorizer::{Actor, AdminAuthorizer, FulfillmentAuthorizer};
pub use catalog::{CatalogService, InMemoryCatalog};
pub use gateway::{InMemoryPaymentGateway, PaymentGateway};
