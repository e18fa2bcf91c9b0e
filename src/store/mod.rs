//! Persistence layer
//!
//! Two backends implement the same traits: [`PgStore`] for Postgres and
//! [`MemoryStore`] for credential-free development and tests. Every
//! multi-field mutation (stock decrement + order insert, review append +
//! rating recompute, the paid/delivered transitions) is atomic inside a
//! single store call.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Order, PaymentResult, Product, ProductUpdate, Review, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("requested {requested} of {name} but only {available} in stock")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },
    #[error("order is already paid")]
    AlreadyPaid,
    #[error("order is not paid")]
    NotPaid,
    #[error("order is already delivered")]
    AlreadyDelivered,
    #[error("product already reviewed by this user")]
    DuplicateReview,
    #[error("email is already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Newest first, with an optional case-insensitive name filter.
    /// Returns the page and the total match count.
    async fn list_products(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), StoreError>;

    async fn get_product(&self, id: Uuid) -> Result<Product, StoreError>;

    async fn create_product(&self, product: Product) -> Result<Product, StoreError>;

    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product, StoreError>;

    async fn delete_product(&self, id: Uuid) -> Result<(), StoreError>;

    /// Append a review and recompute the rating aggregate in one atomic
    /// step. One review per (user, product).
    async fn add_review(&self, product_id: Uuid, review: Review) -> Result<Product, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Commit an order: decrement stock for every line and insert the
    /// order, or change nothing. Two orders racing for the last unit
    /// cannot both succeed.
    async fn place_order(&self, order: Order) -> Result<Order, StoreError>;

    async fn get_order(&self, id: Uuid) -> Result<Order, StoreError>;

    async fn list_orders(&self, limit: i64, offset: i64) -> Result<(Vec<Order>, i64), StoreError>;

    async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;

    /// CREATED -> PAID, conditional on the order being unpaid. Concurrent
    /// captures of the same order: exactly one wins.
    async fn mark_paid(&self, id: Uuid, result: PaymentResult) -> Result<Order, StoreError>;

    /// PAID -> DELIVERED, conditional on paid and not yet delivered.
    async fn mark_delivered(&self, id: Uuid) -> Result<Order, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    async fn get_user(&self, id: Uuid) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn update_user(&self, user: User) -> Result<User, StoreError>;
}

/// Everything the application needs from a backend.
pub trait Store: CatalogStore + OrderStore + UserStore {}

impl<T: CatalogStore + OrderStore + UserStore> Store for T {}
