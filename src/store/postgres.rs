//! Postgres backend
//!
//! Reviews, order lines, addresses and payment records live as jsonb on
//! their parent row, so every aggregate mutation is one row write. Guarded
//! transitions use conditional UPDATEs; stock movements lock the product
//! rows first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Order, OrderItem, PaymentMethod, PaymentResult, Product, ProductError, ProductUpdate, Review,
    Role, ShippingAddress, User,
};
use crate::pricing::Totals;
use crate::store::{CatalogStore, OrderStore, StoreError, UserStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    brand: String,
    category: String,
    image: String,
    price: Decimal,
    count_in_stock: i32,
    rating: Decimal,
    num_reviews: i32,
    reviews: Json<Vec<Review>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            brand: row.brand,
            category: row.category,
            image: row.image,
            price: row.price,
            count_in_stock: row.count_in_stock as u32,
            rating: row.rating,
            num_reviews: row.num_reviews as u32,
            reviews: row.reviews.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    items: Json<Vec<OrderItem>>,
    shipping_address: Json<ShippingAddress>,
    payment_method: String,
    items_price: Decimal,
    shipping_price: Decimal,
    tax_price: Decimal,
    total_price: Decimal,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    payment_result: Option<Json<PaymentResult>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            shipping_address: row.shipping_address.0,
            payment_method: row.payment_method.parse().unwrap_or(PaymentMethod::PayPal),
            totals: Totals {
                items_price: row.items_price,
                shipping_price: row.shipping_price,
                tax_price: row.tax_price,
                total_price: row.total_price,
            },
            is_paid: row.is_paid,
            paid_at: row.paid_at,
            payment_result: row.payment_result.map(|r| r.0),
            is_delivered: row.is_delivered,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().unwrap_or(Role::Customer),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn map_unique_email(e: sqlx::Error) -> StoreError {
    match e.as_database_error().and_then(|d| d.constraint()) {
        Some("idx_users_email") => StoreError::DuplicateEmail,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_products(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), StoreError> {
        let like = format!("%{}%", keyword.unwrap_or(""));
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE name ILIKE $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(&like)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE name ILIKE $1")
            .bind(&like)
            .fetch_one(&self.pool)
            .await?;
        Ok((rows.into_iter().map(Product::from).collect(), total.0))
    }

    async fn get_product(&self, id: Uuid) -> Result<Product, StoreError> {
        sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Product::from)
            .ok_or(StoreError::NotFound("product"))
    }

    async fn create_product(&self, product: Product) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (id, name, description, brand, category, image, price, \
             count_in_stock, rating, num_reviews, reviews, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(&product.category)
        .bind(&product.image)
        .bind(product.price)
        .bind(product.count_in_stock as i32)
        .bind(product.rating)
        .bind(product.num_reviews as i32)
        .bind(Json(&product.reviews))
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE products SET name = $2, description = $3, brand = $4, category = $5, \
             image = $6, price = $7, count_in_stock = $8, updated_at = $9 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.brand)
        .bind(&update.category)
        .bind(&update.image)
        .bind(update.price)
        .bind(update.count_in_stock as i32)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Product::from).ok_or(StoreError::NotFound("product"))
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), StoreError> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("product"));
        }
        Ok(())
    }

    async fn add_review(&self, product_id: Uuid, review: Review) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("product"))?;
        let mut product = Product::from(row);
        product.add_review(review).map_err(|e| match e {
            ProductError::DuplicateReview => StoreError::DuplicateReview,
            other => StoreError::Invalid(other.to_string()),
        })?;
        sqlx::query(
            "UPDATE products SET rating = $2, num_reviews = $3, reviews = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(product.id)
        .bind(product.rating)
        .bind(product.num_reviews as i32)
        .bind(Json(&product.reviews))
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(product)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn place_order(&self, order: Order) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;
        // Lock product rows in a stable order so concurrent checkouts
        // cannot deadlock.
        let mut lines = order.items.clone();
        lines.sort_by_key(|i| i.product_id);
        for item in &lines {
            let row: Option<(String, i32)> =
                sqlx::query_as("SELECT name, count_in_stock FROM products WHERE id = $1 FOR UPDATE")
                    .bind(item.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let (name, available) = row.ok_or(StoreError::NotFound("product"))?;
            if i64::from(item.qty) > i64::from(available) {
                return Err(StoreError::InsufficientStock {
                    name,
                    requested: item.qty,
                    available: available.max(0) as u32,
                });
            }
            sqlx::query(
                "UPDATE products SET count_in_stock = count_in_stock - $2, updated_at = $3 \
                 WHERE id = $1",
            )
            .bind(item.product_id)
            .bind(item.qty as i32)
            .bind(order.created_at)
            .execute(&mut *tx)
            .await?;
        }
        sqlx::query(
            "INSERT INTO orders (id, user_id, items, shipping_address, payment_method, \
             items_price, shipping_price, tax_price, total_price, is_paid, paid_at, \
             payment_result, is_delivered, delivered_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(Json(&order.shipping_address))
        .bind(order.payment_method.as_str())
        .bind(order.totals.items_price)
        .bind(order.totals.shipping_price)
        .bind(order.totals.tax_price)
        .bind(order.totals.total_price)
        .bind(order.is_paid)
        .bind(order.paid_at)
        .bind(order.payment_result.as_ref().map(Json))
        .bind(order.is_delivered)
        .bind(order.delivered_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> Result<Order, StoreError> {
        sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Order::from)
            .ok_or(StoreError::NotFound("order"))
    }

    async fn list_orders(&self, limit: i64, offset: i64) -> Result<(Vec<Order>, i64), StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok((rows.into_iter().map(Order::from).collect(), total.0))
    }

    async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn mark_paid(&self, id: Uuid, result: PaymentResult) -> Result<Order, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET is_paid = TRUE, paid_at = $2, payment_result = $3, updated_at = $2 \
             WHERE id = $1 AND is_paid = FALSE RETURNING *",
        )
        .bind(id)
        .bind(now)
        .bind(Json(&result))
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(r) => Ok(r.into()),
            None => {
                let found: Option<(bool,)> = sqlx::query_as("SELECT is_paid FROM orders WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
                match found {
                    None => Err(StoreError::NotFound("order")),
                    Some(_) => Err(StoreError::AlreadyPaid),
                }
            }
        }
    }

    async fn mark_delivered(&self, id: Uuid) -> Result<Order, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET is_delivered = TRUE, delivered_at = $2, updated_at = $2 \
             WHERE id = $1 AND is_paid = TRUE AND is_delivered = FALSE RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(r) => Ok(r.into()),
            None => {
                let found: Option<(bool, bool)> =
                    sqlx::query_as("SELECT is_paid, is_delivered FROM orders WHERE id = $1")
                        .bind(id)
                        .fetch_optional(&self.pool)
                        .await?;
                match found {
                    None => Err(StoreError::NotFound("order")),
                    Some((_, true)) => Err(StoreError::AlreadyDelivered),
                    Some(_) => Err(StoreError::NotPaid),
                }
            }
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_email)?;
        Ok(row.into())
    }

    async fn get_user(&self, id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or(StoreError::NotFound("user"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn update_user(&self, user: User) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, role = $5, \
             updated_at = $6 WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_email)?;
        row.map(User::from).ok_or(StoreError::NotFound("user"))
    }
}
