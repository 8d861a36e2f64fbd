//! Order query, payment, and delivery endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::FlowError;
use common::OrderId;
use domain::{Order, PaymentCapture};
use serde::Deserialize;
use store::{CartStore, OrderRepository};

use super::OrderResponse;
use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct PaymentCallbackRequest {
    pub transaction_id: String,
    pub status: String,
    pub payer_email: String,
}

// -- Handlers --

/// GET /orders — the caller's orders, newest first.
#[tracing::instrument(skip(state, auth))]
pub async fn list<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let orders = state
        .orders
        .find_by_user(auth.user_id)
        .await
        .map_err(FlowError::from)?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/{id} — one order, readable by its owner or an admin.
#[tracing::instrument(skip(state, auth))]
pub async fn get<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .find_by_id(order_id)
        .await
        .map_err(FlowError::from)?
        .ok_or(FlowError::OrderNotFound(order_id))?;

    ensure_can_view(&order, &auth)?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/{id}/pay — drive the gateway capture for a PayPal order.
#[tracing::instrument(skip(state, auth))]
pub async fn pay<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .find_by_id(order_id)
        .await
        .map_err(FlowError::from)?
        .ok_or(FlowError::OrderNotFound(order_id))?;
    ensure_can_view(&order, &auth)?;

    let order = state.payments.capture_payment(order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/{id}/payments/callback — record an external capture
/// result. Idempotent: a duplicate confirmation returns the stored order
/// with its original capture.
///
/// The gateway authenticates out of band (shared secret at the edge), so
/// this route carries no user identity.
#[tracing::instrument(skip(state, req))]
pub async fn payment_callback<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentCallbackRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let capture = PaymentCapture::new(req.transaction_id, req.status, req.payer_email);

    let order = state.payments.record_payment(order_id, capture).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/{id}/deliver — mark delivered (fulfillment role).
#[tracing::instrument(skip(state, auth))]
pub async fn deliver<CS, R>(
    State(state): State<Arc<AppState<CS, R>>>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    CS: CartStore + 'static,
    R: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state
        .payments
        .mark_delivered(order_id, &auth.actor())
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}

fn ensure_can_view(order: &Order, auth: &AuthContext) -> Result<(), ApiError> {
    if order.user_id() == auth.user_id || auth.is_admin {
        Ok(())
    } else {
        Err(ApiError::Flow(FlowError::Unauthorized))
    }
}
