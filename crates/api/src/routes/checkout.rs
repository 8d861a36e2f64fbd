//! Checkout step endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use checkout::FlowError;
use domain::{PaymentMethod, ShippingAddress};
use serde::Deserialize;
use store::{CartStore, OrderRepository};

use super::{CheckoutResponse, OrderResponse};
use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct ShippingAddressRequest {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Deserialize)]
pub struct PaymentMethodRequest {
    pub method: PaymentMethod,
}

// -- Handlers --

/// PUT /checkout/shipping-address — capture the delivery address.
#[tracing::instrument(skip(state, auth, req))]
pub async fn set_shipping_address<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
    Json(req): Json<ShippingAddressRequest>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let address = ShippingAddress::new(req.address, req.city, req.postal_code, req.country)
        .map_err(|e| FlowError::Checkout(e.into()))?;

    let checkout = state
        .checkouts
        .set_shipping_address(&auth.session_id, address)
        .await?;
    Ok(Json(CheckoutResponse::from_domain(&checkout)?))
}

/// PUT /checkout/payment-method — choose how to pay.
#[tracing::instrument(skip(state, auth, req))]
pub async fn set_payment_method<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
    Json(req): Json<PaymentMethodRequest>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let checkout = state
        .checkouts
        .set_payment_method(&auth.session_id, req.method)
        .await?;
    Ok(Json(CheckoutResponse::from_domain(&checkout)?))
}

/// POST /checkout/submit — freeze the order. 201 on success.
#[tracing::instrument(skip(state, auth))]
pub async fn submit<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let order = state
        .checkouts
        .submit(&auth.session_id, auth.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}
