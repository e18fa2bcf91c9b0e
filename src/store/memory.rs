//! In-memory backend

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::user::hash_password;
use crate::domain::{
    Order, OrderError, PaymentResult, Product, ProductError, ProductUpdate, Review, Role, User,
};
use crate::store::{CatalogStore, OrderStore, StoreError, UserStore};

/// Credential-free backend holding everything in process memory. Every
/// mutation runs under a single write lock, which gives the same atomicity
/// the Postgres backend gets from transactions.
#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<HashMap<Uuid, Product>>,
    orders: RwLock<HashMap<Uuid, Order>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo catalog and accounts for running without a database.
    pub fn demo() -> Result<Self, argon2::password_hash::Error> {
        let mut products = HashMap::new();

        let mut airpods = Product::new(
            "Airpods Wireless Bluetooth Headphones",
            "Bluetooth technology lets you connect it with compatible devices wirelessly. \
             High-quality audio offers an immersive listening experience.",
            "Apple",
            "Electronics",
            "/images/airpods.jpg",
            Decimal::new(8999, 2),
            10,
        );
        // Display-only seed ratings. Re-derived from the review list on the
        // first live review.
        airpods.rating = Decimal::new(45, 1);
        airpods.num_reviews = 12;
        products.insert(airpods.id, airpods);

        let mut phone = Product::new(
            "iPhone 15 Pro 256GB Memory",
            "Introducing the iPhone 15 Pro. A transformative triple-camera system that adds \
             tons of capability without complexity.",
            "Apple",
            "Electronics",
            "/images/phone.jpg",
            Decimal::new(99999, 2),
            7,
        );
        phone.rating = Decimal::new(48, 1);
        phone.num_reviews = 8;
        products.insert(phone.id, phone);

        let admin = User::new("Admin User", "admin@email.com", hash_password("123456")?, Role::Admin);
        let customer = User::new("John Doe", "john@email.com", hash_password("123456")?, Role::Customer);
        let users = HashMap::from([(admin.id, admin), (customer.id, customer)]);

        Ok(Self {
            products: RwLock::new(products),
            orders: RwLock::new(HashMap::new()),
            users: RwLock::new(users),
        })
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_products(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), StoreError> {
        let products = self.products.read().await;
        let needle = keyword.map(str::to_lowercase);
        let mut matched: Vec<Product> = products
            .values()
            .filter(|p| match &needle {
                Some(kw) => p.name.to_lowercase().contains(kw),
                None => true,
            })
            .cloned()
            .collect();
        // v7 ids are time-ordered, so id order is creation order
        matched.sort_by(|a, b| b.id.cmp(&a.id));
        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn get_product(&self, id: Uuid) -> Result<Product, StoreError> {
        self.products
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("product"))
    }

    async fn create_product(&self, product: Product) -> Result<Product, StoreError> {
        self.products.write().await.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        let product = products.get_mut(&id).ok_or(StoreError::NotFound("product"))?;
        product.apply(update);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), StoreError> {
        self.products
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("product"))
    }

    async fn add_review(&self, product_id: Uuid, review: Review) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&product_id)
            .ok_or(StoreError::NotFound("product"))?;
        product.add_review(review).map_err(|e| match e {
            ProductError::DuplicateReview => StoreError::DuplicateReview,
            other => StoreError::Invalid(other.to_string()),
        })?;
        Ok(product.clone())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn place_order(&self, order: Order) -> Result<Order, StoreError> {
        let mut products = self.products.write().await;
        // Verify every line before touching anything.
        for item in &order.items {
            let product = products
                .get(&item.product_id)
                .ok_or(StoreError::NotFound("product"))?;
            if item.qty > product.count_in_stock {
                return Err(StoreError::InsufficientStock {
                    name: product.name.clone(),
                    requested: item.qty,
                    available: product.count_in_stock,
                });
            }
        }
        for item in &order.items {
            if let Some(product) = products.get_mut(&item.product_id) {
                product.count_in_stock -= item.qty;
                product.updated_at = order.created_at;
            }
        }
        self.orders.write().await.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> Result<Order, StoreError> {
        self.orders
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("order"))
    }

    async fn list_orders(&self, limit: i64, offset: i64) -> Result<(Vec<Order>, i64), StoreError> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| b.id.cmp(&a.id));
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut mine: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(mine)
    }

    async fn mark_paid(&self, id: Uuid, result: PaymentResult) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound("order"))?;
        order.mark_paid(result, Utc::now()).map_err(|e| match e {
            OrderError::AlreadyPaid => StoreError::AlreadyPaid,
            other => StoreError::Invalid(other.to_string()),
        })?;
        Ok(order.clone())
    }

    async fn mark_delivered(&self, id: Uuid) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound("order"))?;
        order.mark_delivered(Utc::now()).map_err(|e| match e {
            OrderError::NotPaid => StoreError::NotPaid,
            OrderError::AlreadyDelivered => StoreError::AlreadyDelivered,
            other => StoreError::Invalid(other.to_string()),
        })?;
        Ok(order.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::DuplicateEmail);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("user"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound("user"));
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::DuplicateEmail);
        }
        let mut user = user;
        user.updated_at = Utc::now();
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderItem, PaymentMethod, ShippingAddress};
    use crate::pricing::PricingRules;

    fn address() -> ShippingAddress {
        ShippingAddress {
            address: "1 Main St".into(),
            city: "Springfield".into(),
            postal_code: "12345".into(),
            country: "US".into(),
        }
    }

    fn order_for(product: &Product, qty: u32) -> Order {
        let items = vec![OrderItem {
            product_id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price,
            qty,
        }];
        let totals = PricingRules::default().quote(items.iter().map(|i| (i.price, i.qty)));
        Order::create(Uuid::new_v4(), items, address(), PaymentMethod::PayPal, totals).unwrap()
    }

    fn capture() -> PaymentResult {
        PaymentResult {
            transaction_id: "TX-1".into(),
            status: "COMPLETED".into(),
            update_time: Utc::now(),
            email: "buyer@example.com".into(),
        }
    }

    #[tokio::test]
    async fn concurrent_orders_cannot_both_take_the_last_unit() {
        let store = MemoryStore::new();
        let product = Product::new("Widget", "d", "Acme", "Tools", "/w.jpg", Decimal::new(100, 0), 1);
        store.create_product(product.clone()).await.unwrap();

        let (a, b) = tokio::join!(
            store.place_order(order_for(&product, 1)),
            store.place_order(order_for(&product, 1)),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert_eq!(store.get_product(product.id).await.unwrap().count_in_stock, 0);
    }

    #[tokio::test]
    async fn failed_orders_leave_stock_untouched() {
        let store = MemoryStore::new();
        let known = Product::new("Widget", "d", "Acme", "Tools", "/w.jpg", Decimal::new(100, 0), 5);
        store.create_product(known.clone()).await.unwrap();

        let mut order = order_for(&known, 2);
        order.items.push(OrderItem {
            product_id: Uuid::new_v4(),
            name: "Ghost".into(),
            image: "/g.jpg".into(),
            price: Decimal::new(10, 0),
            qty: 1,
        });
        let err = store.place_order(order).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound("product")));
        assert_eq!(store.get_product(known.id).await.unwrap().count_in_stock, 5);
    }

    #[tokio::test]
    async fn concurrent_captures_let_exactly_one_win() {
        let store = MemoryStore::new();
        let product = Product::new("Widget", "d", "Acme", "Tools", "/w.jpg", Decimal::new(100, 0), 5);
        store.create_product(product.clone()).await.unwrap();
        let order = store.place_order(order_for(&product, 1)).await.unwrap();

        let (a, b) = tokio::join!(
            store.mark_paid(order.id, capture()),
            store.mark_paid(order.id, capture()),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let stored = store.get_order(order.id).await.unwrap();
        assert!(stored.is_paid);
        assert!(!stored.is_delivered);
    }

    #[tokio::test]
    async fn delivery_gates_on_payment() {
        let store = MemoryStore::new();
        let product = Product::new("Widget", "d", "Acme", "Tools", "/w.jpg", Decimal::new(100, 0), 5);
        store.create_product(product.clone()).await.unwrap();
        let order = store.place_order(order_for(&product, 1)).await.unwrap();

        assert!(matches!(
            store.mark_delivered(order.id).await.unwrap_err(),
            StoreError::NotPaid
        ));
        store.mark_paid(order.id, capture()).await.unwrap();
        store.mark_delivered(order.id).await.unwrap();
        assert!(matches!(
            store.mark_delivered(order.id).await.unwrap_err(),
            StoreError::AlreadyDelivered
        ));
    }

    #[tokio::test]
    async fn reviews_update_the_aggregate_atomically() {
        let store = MemoryStore::new();
        let product = Product::new("Widget", "d", "Acme", "Tools", "/w.jpg", Decimal::new(100, 0), 5);
        store.create_product(product.clone()).await.unwrap();

        let reviewer = Uuid::new_v4();
        store
            .add_review(product.id, Review::new(reviewer, "u", 4, "good"))
            .await
            .unwrap();
        store
            .add_review(product.id, Review::new(Uuid::new_v4(), "v", 5, "great"))
            .await
            .unwrap();
        let err = store
            .add_review(product.id, Review::new(reviewer, "u", 1, "again"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateReview));

        let stored = store.get_product(product.id).await.unwrap();
        assert_eq!(stored.num_reviews, 2);
        assert_eq!(stored.rating, Decimal::new(45, 1));
    }

    #[tokio::test]
    async fn keyword_search_and_pagination() {
        let store = MemoryStore::new();
        for name in ["iPhone 15 Pro", "Pixel Phone", "Headphones"] {
            let p = Product::new(name, "d", "b", "c", "/i.jpg", Decimal::new(10, 0), 1);
            store.create_product(p).await.unwrap();
        }

        let (hits, total) = store.list_products(Some("phone"), 10, 0).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(hits.len(), 3);

        let (hits, total) = store.list_products(Some("pixel"), 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(hits[0].name, "Pixel Phone");

        let (page, total) = store.list_products(None, 2, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn emails_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        let first = User::new("A", "a@example.com", "hash", Role::Customer);
        store.create_user(first.clone()).await.unwrap();

        let dup = User::new("B", "A@Example.com", "hash", Role::Customer);
        assert!(matches!(
            store.create_user(dup).await.unwrap_err(),
            StoreError::DuplicateEmail
        ));

        let second = User::new("C", "c@example.com", "hash", Role::Customer);
        let second = store.create_user(second).await.unwrap();
        let mut renamed = second.clone();
        renamed.email = "a@example.com".into();
        assert!(matches!(
            store.update_user(renamed).await.unwrap_err(),
            StoreError::DuplicateEmail
        ));
    }

    #[tokio::test]
    async fn demo_store_seeds_catalog_and_accounts() {
        let store = MemoryStore::demo().unwrap();
        let (products, total) = store.list_products(None, 10, 0).await.unwrap();
        assert_eq!(total, 2);
        assert!(products.iter().any(|p| p.name.starts_with("Airpods")));

        let admin = store.find_user_by_email("admin@email.com").await.unwrap().unwrap();
        assert!(admin.is_admin());
        assert!(crate::domain::user::verify_password("123456", &admin.password_hash));
    }
}
