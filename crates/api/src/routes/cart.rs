//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::ProductId;
use serde::Deserialize;
use store::{CartStore, OrderRepository};

use super::CheckoutResponse;
use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

// -- Handlers --

/// GET /cart — the session's cart with derived totals.
#[tracing::instrument(skip(state, auth))]
pub async fn get<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let checkout = state.carts.get(&auth.session_id).await?;
    Ok(Json(CheckoutResponse::from_domain(&checkout)?))
}

/// POST /cart/items — add a product, capturing its catalog snapshot.
#[tracing::instrument(skip(state, auth, req))]
pub async fn add_item<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let product_id = ProductId::new(req.product_id);
    let checkout = state
        .carts
        .add_item(&auth.session_id, &product_id, req.quantity)
        .await?;
    Ok(Json(CheckoutResponse::from_domain(&checkout)?))
}

/// PUT /cart/items/{product_id} — set a line item's quantity.
#[tracing::instrument(skip(state, auth, req))]
pub async fn update_item<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
    Path(product_id): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let product_id = ProductId::new(product_id);
    let checkout = state
        .carts
        .update_quantity(&auth.session_id, &product_id, req.quantity)
        .await?;
    Ok(Json(CheckoutResponse::from_domain(&checkout)?))
}

/// DELETE /cart/items/{product_id} — remove a line item.
#[tracing::instrument(skip(state, auth))]
pub async fn remove_item<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
    Path(product_id): Path<String>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let product_id = ProductId::new(product_id);
    let checkout = state
        .carts
        .remove_item(&auth.session_id, &product_id)
        .await?;
    Ok(Json(CheckoutResponse::from_domain(&checkout)?))
}
