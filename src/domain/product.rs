//! Product aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::pricing::round_rating;

/// Catalog product with embedded reviews. `rating` and `num_reviews` are
/// derived aggregates: they only ever change through [`Product::add_review`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub image: String,
    pub price: Decimal,
    pub count_in_stock: u32,
    pub rating: Decimal,
    pub num_reviews: u32,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer review, owned by its parent product. One per (user, product).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: Uuid,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog fields an admin may edit. Rating aggregates and reviews are
/// never writable through updates.
#[derive(Clone, Debug)]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub image: String,
    pub price: Decimal,
    pub count_in_stock: u32,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    #[error("rating must be an integer between 1 and 5")]
    RatingOutOfRange,
    #[error("product already reviewed by this user")]
    DuplicateReview,
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        brand: impl Into<String>,
        category: impl Into<String>,
        image: impl Into<String>,
        price: Decimal,
        count_in_stock: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: description.into(),
            brand: brand.into(),
            category: category.into(),
            image: image.into(),
            price,
            count_in_stock,
            rating: Decimal::ZERO,
            num_reviews: 0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.count_in_stock > 0
    }

    /// Append a review and recompute the aggregate: arithmetic mean of all
    /// review ratings rounded to one decimal place, count incremented.
    pub fn add_review(&mut self, review: Review) -> Result<(), ProductError> {
        if !(1..=5).contains(&review.rating) {
            return Err(ProductError::RatingOutOfRange);
        }
        if self.reviews.iter().any(|r| r.user_id == review.user_id) {
            return Err(ProductError::DuplicateReview);
        }
        self.reviews.push(review);
        self.num_reviews = self.reviews.len() as u32;
        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        self.rating = round_rating(Decimal::from(sum) / Decimal::from(self.num_reviews));
        self.touch();
        Ok(())
    }

    pub fn apply(&mut self, update: ProductUpdate) {
        self.name = update.name;
        self.description = update.description;
        self.brand = update.brand;
        self.category = update.category;
        self.image = update.image;
        self.price = update.price;
        self.count_in_stock = update.count_in_stock;
        self.touch();
    }

    /// Remove stock for an order line. All-or-nothing per product.
    pub fn take_stock(&mut self, qty: u32) -> Result<(), ProductError> {
        if qty > self.count_in_stock {
            return Err(ProductError::InsufficientStock {
                requested: qty,
                available: self.count_in_stock,
            });
        }
        self.count_in_stock -= qty;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Review {
    pub fn new(user_id: Uuid, name: impl Into<String>, rating: u8, comment: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            rating,
            comment: comment.into(),
            created_at: Utc::now(),
        }
    }
}
