//! HTTP API server with observability for the storefront order engine.
//!
//! Provides REST endpoints for the cart, the checkout steps, and order
//! payment/delivery, with structured logging (tracing) and Prometheus
//! metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use checkout::{
    AdminAuthorizer, CartService, CheckoutService, InMemoryCatalog, InMemoryPaymentGateway,
    ReconciliationService,
};
use common::ProductId;
use domain::{Money, ProductSnapshot};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{CartStore, InMemoryCartStore, InMemoryOrderRepository, OrderRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
///
/// Generic over the two persistence collaborators so the same wiring
/// serves the in-memory stores in development and the PostgreSQL stores
/// in production. The catalog, gateway, and authorizer are external
/// collaborators; the in-memory stand-ins live here until a real
/// integration replaces them.
pub struct AppState<CS, R>
where
    CS: CartStore,
    R: OrderRepository,
{
    pub carts: CartService<CS, InMemoryCatalog>,
    pub checkouts: CheckoutService<CS, R>,
    pub payments: ReconciliationService<R, InMemoryPaymentGateway, AdminAuthorizer>,
    pub orders: R,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<CS, R>(state: Arc<AppState<CS, R>>, metrics_handle: PrometheusHandle) -> Router
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::get::<CS, R>))
        .route("/cart/items", post(routes::cart::add_item::<CS, R>))
        .route(
            "/cart/items/{product_id}",
            put(routes::cart::update_item::<CS, R>).delete(routes::cart::remove_item::<CS, R>),
        )
        .route(
            "/checkout/shipping-address",
            put(routes::checkout::set_shipping_address::<CS, R>),
        )
        .route(
            "/checkout/payment-method",
            put(routes::checkout::set_payment_method::<CS, R>),
        )
        .route("/checkout/submit", post(routes::checkout::submit::<CS, R>))
        .route("/orders", get(routes::orders::list::<CS, R>))
        .route("/orders/{id}", get(routes::orders::get::<CS, R>))
        .route("/orders/{id}/pay", post(routes::orders::pay::<CS, R>))
        .route(
            "/orders/{id}/payments/callback",
            post(routes::orders::payment_callback::<CS, R>),
        )
        .route("/orders/{id}/deliver", post(routes::orders::deliver::<CS, R>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the services over the given persistence collaborators.
pub fn build_state<CS, R>(cart_store: CS, orders: R, config: &Config) -> Arc<AppState<CS, R>>
where
    CS: CartStore + Clone,
    R: OrderRepository + Clone,
{
    let catalog = InMemoryCatalog::new();
    seed_demo_catalog(&catalog);
    let gateway = InMemoryPaymentGateway::new();

    Arc::new(AppState {
        carts: CartService::new(cart_store.clone(), catalog),
        checkouts: CheckoutService::new(cart_store, orders.clone(), config.pricing()),
        payments: ReconciliationService::new(orders.clone(), gateway, AdminAuthorizer::new())
            .with_capture_timeout(config.capture_timeout()),
        orders,
    })
}

/// Creates the default application state over the in-memory stores.
pub fn create_default_state(
    config: &Config,
) -> Arc<AppState<InMemoryCartStore, InMemoryOrderRepository>> {
    build_state(InMemoryCartStore::new(), InMemoryOrderRepository::new(), config)
}

/// Seeds the demo catalog, standing in for the catalog collaborator.
fn seed_demo_catalog(catalog: &InMemoryCatalog) {
    let products = [
        ("SKU-HDPH-01", "Wireless Headphones", 500u32, 12u32),
        ("SKU-CASE-02", "Leather Phone Case", 200, 40),
        ("SKU-WTCH-03", "Fitness Watch", 2500, 8),
        ("SKU-SPKR-04", "Bluetooth Speaker", 1200, 15),
        ("SKU-CBLE-05", "Braided USB-C Cable", 150, 100),
    ];

    for (id, name, rupees, stock) in products {
        catalog.insert(ProductSnapshot {
            product_id: ProductId::new(id),
            name: name.to_string(),
            image: format!("/images/{}.jpg", id.to_lowercase()),
            price: Money::inr(rupees),
            stock_limit: stock,
        });
    }
}
