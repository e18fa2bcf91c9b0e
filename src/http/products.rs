//! Catalog handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Product, ProductEvent, ProductUpdate, Review};
use crate::error::ApiError;
use crate::http::extract::{Admin, CurrentUser};
use crate::http::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: u32,
    pub pages: u32,
    pub total: i64,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductPage>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 50);
    let keyword = query
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());
    let offset = i64::from(page - 1) * i64::from(per_page);
    let (products, total) = state
        .store
        .list_products(keyword, i64::from(per_page), offset)
        .await?;
    let pages = (total.max(0) as u32).div_ceil(per_page);
    Ok(Json(ProductPage {
        products,
        page,
        pages,
        total,
    }))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.store.get_product(id).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub image: String,
    pub price: Decimal,
    pub count_in_stock: u32,
}

pub async fn create_product(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    Json(req): Json<ProductBody>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    req.validate()?;
    if req.price < Decimal::ZERO {
        return Err(ApiError::validation("price must not be negative"));
    }
    let product = Product::new(
        req.name,
        req.description,
        req.brand,
        req.category,
        req.image,
        req.price,
        req.count_in_stock,
    );
    let product = state.store.create_product(product).await?;
    state
        .publish(ProductEvent::Created {
            product_id: product.id,
        })
        .await;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Admin catalog edit. Rating aggregates and reviews are not editable
/// through this route.
pub async fn update_product(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    Path(id): Path<Uuid>,
    Json(req): Json<ProductBody>,
) -> Result<Json<Product>, ApiError> {
    req.validate()?;
    if req.price < Decimal::ZERO {
        return Err(ApiError::validation("price must not be negative"));
    }
    let before = state.store.get_product(id).await?;
    let update = ProductUpdate {
        name: req.name,
        description: req.description,
        brand: req.brand,
        category: req.category,
        image: req.image,
        price: req.price,
        count_in_stock: req.count_in_stock,
    };
    let product = state.store.update_product(id, update).await?;
    if let Some(event) = stock_event(&before, &product) {
        state.publish(event).await;
    }
    Ok(Json(product))
}

/// Admin edits only report a stock event when the stock figure moved;
/// name, description and price edits stay silent.
fn stock_event(before: &Product, after: &Product) -> Option<ProductEvent> {
    (before.count_in_stock != after.count_in_stock).then(|| ProductEvent::StockAdjusted {
        product_id: after.id,
        count_in_stock: after.count_in_stock,
    })
}

pub async fn delete_product(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(min = 1, message = "comment is required"))]
    pub comment: String,
}

pub async fn add_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    req.validate()?;
    let review = Review::new(current.user.id, current.user.name, req.rating, req.comment);
    let product = state.store.add_review(id, review).await?;
    state
        .publish(ProductEvent::Reviewed {
            product_id: product.id,
            rating: req.rating,
            num_reviews: product.num_reviews,
        })
        .await;
    Ok((StatusCode::CREATED, Json(product)))
}
