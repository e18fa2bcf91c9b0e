//! Checkout and order handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Order, OrderEvent, OrderItem, PaymentMethod, ShippingAddress};
use crate::error::ApiError;
use crate::http::extract::{Admin, CurrentUser};
use crate::http::products::ListQuery;
use crate::http::AppState;
use crate::payment::{PaymentConfirmation, SandboxGateway};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressRequest {
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "postal code is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, message = "country is required"))]
    pub country: String,
}

impl From<ShippingAddressRequest> for ShippingAddress {
    fn from(req: ShippingAddressRequest) -> Self {
        Self {
            address: req.address,
            city: req.city,
            postal_code: req.postal_code,
            country: req.country,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    #[validate]
    pub shipping_address: ShippingAddressRequest,
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub qty: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: u32,
    pub pages: u32,
    pub total: i64,
}

/// Checkout submission. The client names products and quantities only;
/// unit prices and totals are taken from the live catalog, never from the
/// request. Stock decrement and order insert commit atomically in the
/// store, so a lost race for the last unit fails the whole order.
pub async fn create_order(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    req.validate()?;
    if req.items.is_empty() {
        return Err(ApiError::validation("order must contain at least one item"));
    }
    let payment_method: PaymentMethod = req
        .payment_method
        .parse()
        .map_err(|_| ApiError::validation("payment method must be PayPal or Stripe"))?;

    let mut items = Vec::with_capacity(req.items.len());
    for line in &req.items {
        let product = state.store.get_product(line.product_id).await?;
        // Advisory pre-check; the store re-checks under lock at commit.
        if line.qty > product.count_in_stock {
            return Err(ApiError::conflict(format!(
                "requested {} of {} but only {} in stock",
                line.qty, product.name, product.count_in_stock
            )));
        }
        items.push(OrderItem {
            product_id: product.id,
            name: product.name,
            image: product.image,
            price: product.price,
            qty: line.qty,
        });
    }

    let totals = state
        .config
        .pricing
        .quote(items.iter().map(|i| (i.price, i.qty)));
    let order = Order::create(
        current.user.id,
        items,
        req.shipping_address.into(),
        payment_method,
        totals,
    )?;
    let order = state.store.place_order(order).await?;
    tracing::info!(order_id = %order.id, user_id = %order.user_id, total = %order.totals.total_price, "order placed");

    let mut session = current.session;
    session.cart.clear();
    state.sessions.save(session).await;

    state
        .publish(OrderEvent::Placed {
            order_id: order.id,
            user_id: order.user_id,
            total: order.totals.total_price,
        })
        .await;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Owner or admin.
pub async fn get_order(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state.store.get_order(id).await?;
    if order.user_id != current.user.id && !current.user.is_admin() {
        return Err(ApiError::forbidden("order belongs to another user"));
    }
    Ok(Json(order))
}

pub async fn list_my_orders(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(
        state.store.list_orders_for_user(current.user.id).await?,
    ))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    Query(query): Query<ListQuery>,
) -> Result<Json<OrderPage>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 50);
    let offset = i64::from(page - 1) * i64::from(per_page);
    let (orders, total) = state
        .store
        .list_orders(i64::from(per_page), offset)
        .await?;
    let pages = (total.max(0) as u32).div_ceil(per_page);
    Ok(Json(OrderPage {
        orders,
        page,
        pages,
        total,
    }))
}

/// Payment capture with a provider-reported confirmation.
pub async fn pay_order(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(confirmation): Json<PaymentConfirmation>,
) -> Result<Json<Order>, ApiError> {
    capture(&state, &current, id, confirmation).await
}

/// Synthetic capture for environments without provider connectivity.
/// Walks through the same guards and the same store transition as the
/// provider path.
pub async fn pay_order_test(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    if !state.config.test_pay_enabled() {
        return Err(ApiError::forbidden(
            "test payments are disabled when a payment provider is configured",
        ));
    }
    let confirmation = SandboxGateway::synthesize(&current.user.email);
    capture(&state, &current, id, confirmation).await
}

/// Guards in order: order exists, caller owns it, not already paid,
/// provider confirms. The store transition is conditional, so a racing
/// double capture still loses there.
async fn capture(
    state: &AppState,
    current: &CurrentUser,
    id: Uuid,
    confirmation: PaymentConfirmation,
) -> Result<Json<Order>, ApiError> {
    let order = state.store.get_order(id).await?;
    if order.user_id != current.user.id {
        return Err(ApiError::forbidden("order belongs to another user"));
    }
    if order.is_paid {
        return Err(ApiError::conflict("order is already paid"));
    }
    let result = state.gateway.confirm(confirmation).await?;
    let transaction_id = result.transaction_id.clone();
    let order = state.store.mark_paid(id, result).await?;
    tracing::info!(order_id = %order.id, %transaction_id, "payment captured");
    state
        .publish(OrderEvent::Paid {
            order_id: order.id,
            transaction_id,
        })
        .await;
    Ok(Json(order))
}

/// Admin-only, one-way, and only for paid orders.
pub async fn deliver_order(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state.store.mark_delivered(id).await?;
    tracing::info!(order_id = %order.id, "order delivered");
    state
        .publish(OrderEvent::Delivered { order_id: order.id })
        .await;
    Ok(Json(order))
}
