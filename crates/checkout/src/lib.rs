//! Application services for the cart-to-order lifecycle.
//!
//! Three services drive the flow:
//! 1. [`CartService`] — load/mutate/persist for a session's cart
//! 2. [`CheckoutService`] — the wizard steps and order submission
//! 3. [`ReconciliationService`] — payment capture/confirmation and
//!    delivery, each reconciled exactly once against order state
//!
//! The external world (catalog, payment gateway, authorization) enters
//! through the traits in [`services`], with in-memory implementations for
//! tests and development.

pub mod cart_service;
pub mod checkout_service;
pub mod error;
pub mod reconciliation;
pub mod services;

pub use cart_service::CartService;
pub use checkout_service::CheckoutService;
pub use error::{FlowError, Result};
pub use reconciliation::{DEFAULT_CAPTURE_TIMEOUT, ReconciliationService};
pub use services::{
    Actor, AdminAuthorizer, CatalogService, FulfillmentAuthorizer, InMemoryCatalog,
    InMemoryPaymentGateway, PaymentGateway,
};
