//! Session cart handlers
//!
//! The cart lives on the session, not in the store; totals are recomputed
//! with the configured pricing rules on every mutation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::Cart;
use crate::error::ApiError;
use crate::http::extract::SessionCtx;
use crate::http::orders::ShippingAddressRequest;
use crate::http::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetItemRequest {
    pub product_id: Uuid,
    pub qty: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPaymentRequest {
    pub payment_method: String,
}

pub async fn get_cart(SessionCtx(session): SessionCtx) -> Json<Cart> {
    Json(session.cart)
}

/// Insert or replace a cart line, snapshotting the live product. The
/// quantity is absolute; sending the same product again re-sets it.
pub async fn set_item(
    State(state): State<AppState>,
    SessionCtx(mut session): SessionCtx,
    Json(req): Json<SetItemRequest>,
) -> Result<Json<Cart>, ApiError> {
    let product = state.store.get_product(req.product_id).await?;
    session
        .cart
        .set_item(&product, req.qty, &state.config.pricing)?;
    let cart = session.cart.clone();
    state.sessions.save(session).await;
    Ok(Json(cart))
}

pub async fn remove_item(
    State(state): State<AppState>,
    SessionCtx(mut session): SessionCtx,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Cart>, ApiError> {
    session.cart.remove_item(product_id, &state.config.pricing)?;
    let cart = session.cart.clone();
    state.sessions.save(session).await;
    Ok(Json(cart))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    SessionCtx(mut session): SessionCtx,
) -> Result<StatusCode, ApiError> {
    session.cart.clear();
    state.sessions.save(session).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_shipping(
    State(state): State<AppState>,
    SessionCtx(mut session): SessionCtx,
    Json(req): Json<ShippingAddressRequest>,
) -> Result<Json<Cart>, ApiError> {
    req.validate()?;
    session.cart.set_shipping_address(req.into());
    let cart = session.cart.clone();
    state.sessions.save(session).await;
    Ok(Json(cart))
}

pub async fn set_payment(
    State(state): State<AppState>,
    SessionCtx(mut session): SessionCtx,
    Json(req): Json<SetPaymentRequest>,
) -> Result<Json<Cart>, ApiError> {
    let method = req
        .payment_method
        .parse()
        .map_err(|_| ApiError::validation("payment method must be PayPal or Stripe"))?;
    session.cart.set_payment_method(method);
    let cart = session.cart.clone();
    state.sessions.save(session).await;
    Ok(Json(cart))
}
