//! End-to-end tests against the router and the in-memory store.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use storefront_api::config::Config;
use storefront_api::domain::user::hash_password;
use storefront_api::domain::{Product, Role, User};
use storefront_api::http::{router, AppState};
use storefront_api::pricing::PricingRules;
use storefront_api::store::{CatalogStore, MemoryStore, UserStore};

const ADMIN_EMAIL: &str = "admin@example.com";
const BUYER_EMAIL: &str = "buyer@example.com";
const PASSWORD: &str = "s3cret99";

fn test_config() -> Config {
    Config {
        port: 0,
        database_url: None,
        nats_url: None,
        paypal_client_id: None,
        pricing: PricingRules {
            free_shipping_threshold: Decimal::new(500, 0),
            shipping_flat: Decimal::new(10, 0),
            tax_rate: Decimal::new(5, 2),
        },
    }
}

/// Router over a seeded in-memory store: one product (price 100, stock 5),
/// one admin, one customer.
async fn test_app() -> (Router, Arc<MemoryStore>, Product) {
    test_app_with(test_config()).await
}

async fn test_app_with(config: Config) -> (Router, Arc<MemoryStore>, Product) {
    let store = Arc::new(MemoryStore::new());
    let product = Product::new(
        "Widget",
        "A widget",
        "Acme",
        "Tools",
        "/images/widget.jpg",
        Decimal::new(100, 0),
        5,
    );
    store.create_product(product.clone()).await.unwrap();
    for (name, email, role) in [
        ("Admin", ADMIN_EMAIL, Role::Admin),
        ("Buyer", BUYER_EMAIL, Role::Customer),
    ] {
        let user = User::new(name, email, hash_password(PASSWORD).unwrap(), role);
        store.create_user(user).await.unwrap();
    }
    let app = router(AppState::new(store.clone(), config, None));
    (app, store, product)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router, email: &str) -> Uuid {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/users/auth",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().parse().unwrap()
}

fn dec(value: &Value, key: &str) -> Decimal {
    Decimal::from_str(value[key].as_str().expect(key)).unwrap()
}

fn address() -> Value {
    json!({
        "address": "1 Main St",
        "city": "Springfield",
        "postalCode": "12345",
        "country": "US"
    })
}

fn order_body(product_id: Uuid, qty: u32) -> Value {
    json!({
        "items": [{ "productId": product_id, "qty": qty }],
        "shippingAddress": address(),
        "paymentMethod": "PayPal"
    })
}

async fn place_order(app: &Router, token: Uuid, product_id: Uuid, qty: u32) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/orders",
        Some(token),
        Some(order_body(product_id, qty)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "order failed: {body}");
    body
}

#[tokio::test]
async fn full_checkout_flow() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;

    // Build the cart: 2 x 100 with flat shipping 10 and 5% tax.
    let (status, cart) = send(
        &app,
        "PUT",
        "/api/v1/cart/items",
        Some(buyer),
        Some(json!({ "productId": product.id, "qty": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&cart, "itemsPrice"), Decimal::new(200, 0));
    assert_eq!(dec(&cart, "shippingPrice"), Decimal::new(10, 0));
    assert_eq!(dec(&cart, "taxPrice"), Decimal::new(10, 0));
    assert_eq!(dec(&cart, "totalPrice"), Decimal::new(220, 0));

    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/cart/shipping",
        Some(buyer),
        Some(address()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/cart/payment",
        Some(buyer),
        Some(json!({ "paymentMethod": "PayPal" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let order = place_order(&app, buyer, product.id, 2).await;
    assert_eq!(dec(&order, "totalPrice"), Decimal::new(220, 0));
    assert_eq!(order["isPaid"], json!(false));
    assert_eq!(order["isDelivered"], json!(false));
    let order_id: Uuid = order["id"].as_str().unwrap().parse().unwrap();

    // Stock decremented, session cart cleared.
    let (_, stored) = send(&app, "GET", &format!("/api/v1/products/{}", product.id), None, None).await;
    assert_eq!(stored["countInStock"], json!(3));
    let (_, cart) = send(&app, "GET", "/api/v1/cart", Some(buyer), None).await;
    assert_eq!(cart["items"], json!([]));

    // Synthetic capture, then admin delivery.
    let (status, paid) = send(
        &app,
        "PUT",
        &format!("/api/v1/orders/{order_id}/pay/test"),
        Some(buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["isPaid"], json!(true));
    assert_eq!(paid["paymentResult"]["transactionId"], json!("TEST_TRANSACTION_123"));
    assert_eq!(paid["paymentResult"]["email"], json!(BUYER_EMAIL));

    let admin = login(&app, ADMIN_EMAIL).await;
    let (status, delivered) = send(
        &app,
        "PUT",
        &format!("/api/v1/orders/{order_id}/deliver"),
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["isDelivered"], json!(true));
    assert!(delivered["deliveredAt"].is_string());
}

#[tokio::test]
async fn overstock_order_rejected_and_stock_unchanged() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(buyer),
        Some(order_body(product.id, 6)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("in stock"));

    let (_, stored) = send(&app, "GET", &format!("/api/v1/products/{}", product.id), None, None).await;
    assert_eq!(stored["countInStock"], json!(5));
}

#[tokio::test]
async fn double_capture_conflicts_and_keeps_first_result() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;
    let order = place_order(&app, buyer, product.id, 1).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/orders/{order_id}/pay/test");
    let (status, paid) = send(&app, "PUT", &uri, Some(buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    let first_paid_at = paid["paidAt"].clone();

    let (status, body) = send(&app, "PUT", &uri, Some(buyer), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("order is already paid"));

    let (_, stored) = send(&app, "GET", &format!("/api/v1/orders/{order_id}"), Some(buyer), None).await;
    assert_eq!(stored["paidAt"], first_paid_at);
    assert_eq!(stored["paymentResult"]["transactionId"], json!("TEST_TRANSACTION_123"));
}

#[tokio::test]
async fn provider_captures_carry_transaction_metadata() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;
    let order = place_order(&app, buyer, product.id, 1).await;
    let order_id = order["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/orders/{order_id}/pay");

    // A non-completed confirmation is a provider error; order unchanged.
    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(buyer),
        Some(json!({
            "id": "8XY12345",
            "status": "PENDING",
            "update_time": "2026-08-30T12:00:00Z",
            "payer": { "email_address": BUYER_EMAIL }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["message"].as_str().unwrap().contains("PENDING"));
    let (_, stored) = send(&app, "GET", &format!("/api/v1/orders/{order_id}"), Some(buyer), None).await;
    assert_eq!(stored["isPaid"], json!(false));

    let (status, paid) = send(
        &app,
        "PUT",
        &uri,
        Some(buyer),
        Some(json!({
            "id": "8XY12345",
            "status": "COMPLETED",
            "update_time": "2026-08-30T12:00:00Z",
            "payer": { "email_address": BUYER_EMAIL }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["paymentResult"]["transactionId"], json!("8XY12345"));
    assert_eq!(paid["paymentResult"]["status"], json!("COMPLETED"));
}

#[tokio::test]
async fn delivery_requires_payment_admin_and_happens_once() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let order = place_order(&app, buyer, product.id, 1).await;
    let order_id = order["id"].as_str().unwrap().to_string();
    let deliver = format!("/api/v1/orders/{order_id}/deliver");

    let (status, _) = send(&app, "PUT", &deliver, Some(buyer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "PUT", &deliver, Some(admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("order is not paid"));

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/orders/{order_id}/pay/test"),
        Some(buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "PUT", &deliver, Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "PUT", &deliver, Some(admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("order is already delivered"));
}

#[tokio::test]
async fn orders_are_private_to_their_owner() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;
    let order = place_order(&app, buyer, product.id, 1).await;
    let order_id = order["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/orders/{order_id}");

    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A second customer cannot read or capture someone else's order.
    let (status, other) = send(
        &app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "name": "Other", "email": "other@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let other: Uuid = other["token"].as_str().unwrap().parse().unwrap();

    let (status, _) = send(&app, "GET", &uri, Some(other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "PUT", &format!("{uri}/pay/test"), Some(other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins read any order but the owner sees it under /orders/mine.
    let admin = login(&app, ADMIN_EMAIL).await;
    let (status, _) = send(&app, "GET", &uri, Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, mine) = send(&app, "GET", "/api/v1/orders/mine", Some(buyer), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (_, mine) = send(&app, "GET", "/api/v1/orders/mine", Some(other), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 0);

    let (status, all) = send(&app, "GET", "/api/v1/orders", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total"], json!(1));
    let (status, _) = send(&app, "GET", "/api/v1/orders", Some(buyer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/orders/{}", Uuid::new_v4()),
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reviews_aggregate_and_reject_duplicates() {
    let (app, _store, product) = test_app().await;
    let uri = format!("/api/v1/products/{}/reviews", product.id);

    let mut tokens = vec![login(&app, BUYER_EMAIL).await];
    for i in 0..2 {
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/users",
            None,
            Some(json!({
                "name": format!("Reviewer {i}"),
                "email": format!("reviewer{i}@example.com"),
                "password": PASSWORD
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        tokens.push(body["token"].as_str().unwrap().parse().unwrap());
    }

    for (token, rating) in tokens.iter().zip([4, 4, 5]) {
        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(*token),
            Some(json!({ "rating": rating, "comment": "fine" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, stored) = send(&app, "GET", &format!("/api/v1/products/{}", product.id), None, None).await;
    assert_eq!(dec(&stored, "rating"), Decimal::new(43, 1));
    assert_eq!(stored["numReviews"], json!(3));

    // Second review from the same identity is rejected and counted once.
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(tokens[0]),
        Some(json!({ "rating": 1, "comment": "changed my mind" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already reviewed"));
    let (_, stored) = send(&app, "GET", &format!("/api/v1/products/{}", product.id), None, None).await;
    assert_eq!(stored["numReviews"], json!(3));
}

#[tokio::test]
async fn review_input_is_validated() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;
    let uri = format!("/api/v1/products/{}/reviews", product.id);

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(buyer),
        Some(json!({ "rating": 6, "comment": "over the top" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(buyer),
        Some(json!({ "rating": 4, "comment": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &app,
        "POST",
        &uri,
        None,
        Some(json!({ "rating": 4, "comment": "anonymous" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn order_input_is_validated() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(buyer),
        Some(json!({
            "items": [],
            "shippingAddress": address(),
            "paymentMethod": "PayPal"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("at least one item"));

    let mut incomplete = address();
    incomplete["city"] = json!("");
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(buyer),
        Some(json!({
            "items": [{ "productId": product.id, "qty": 1 }],
            "shippingAddress": incomplete,
            "paymentMethod": "PayPal"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(buyer),
        Some(json!({
            "items": [{ "productId": product.id, "qty": 1 }],
            "shippingAddress": address(),
            "paymentMethod": "Cash"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(buyer),
        Some(order_body(Uuid::new_v4(), 1)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/api/v1/orders", None, Some(order_body(product.id, 1))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cart_rejects_bad_quantities() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/cart/items",
        Some(buyer),
        Some(json!({ "productId": product.id, "qty": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/cart/items",
        Some(buyer),
        Some(json!({ "productId": product.id, "qty": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("in stock"));

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/cart/items/{}", Uuid::new_v4()),
        Some(buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registration_login_and_logout() {
    let (app, _store, _product) = test_app().await;

    // An anonymous session's cart survives registration.
    let (status, session) = send(&app, "POST", "/api/v1/sessions", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let anon: Uuid = session["token"].as_str().unwrap().parse().unwrap();

    let (status, registered) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(anon),
        Some(json!({ "name": "New", "email": "new@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["token"], json!(anon.to_string()));
    assert_eq!(registered["user"]["role"], json!("customer"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "name": "Dup", "email": "new@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already registered"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/users/auth",
        None,
        Some(json!({ "email": "new@example.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, profile) = send(&app, "GET", "/api/v1/users/profile", Some(anon), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], json!("new@example.com"));

    let (status, updated) = send(
        &app,
        "PUT",
        "/api/v1/users/profile",
        Some(anon),
        Some(json!({ "name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], json!("Renamed"));

    let (status, _) = send(&app, "POST", "/api/v1/users/logout", Some(anon), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/api/v1/users/profile", Some(anon), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_manages_the_catalog() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;
    let admin = login(&app, ADMIN_EMAIL).await;

    let body = json!({
        "name": "Gizmo Phone",
        "description": "A phone",
        "brand": "Acme",
        "category": "Electronics",
        "image": "/images/gizmo.jpg",
        "price": "299.99",
        "countInStock": 3
    });
    let (status, _) = send(&app, "POST", "/api/v1/products", Some(buyer), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(&app, "POST", "/api/v1/products", Some(admin), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(dec(&created, "price"), Decimal::new(29999, 2));

    let (status, page) = send(&app, "GET", "/api/v1/products?keyword=phone", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], json!(1));
    assert_eq!(page["products"][0]["name"], json!("Gizmo Phone"));

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/v1/products/{id}"),
        Some(admin),
        Some(json!({
            "name": "Gizmo Phone XL",
            "description": "A bigger phone",
            "brand": "Acme",
            "category": "Electronics",
            "image": "/images/gizmo.jpg",
            "price": "349.99",
            "countInStock": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["countInStock"], json!(2));

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/products/{id}"), Some(admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/v1/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting the catalog entry never rewrites placed orders.
    let order = place_order(&app, buyer, product.id, 1).await;
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/products/{}", product.id),
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, stored) = send(
        &app,
        "GET",
        &format!("/api/v1/orders/{}", order["id"].as_str().unwrap()),
        Some(buyer),
        None,
    )
    .await;
    assert_eq!(stored["items"][0]["name"], json!("Widget"));
    assert_eq!(dec(&stored["items"][0], "price"), Decimal::new(100, 0));
}

#[tokio::test]
async fn pagination_survives_huge_page_numbers() {
    let (app, _store, product) = test_app().await;
    let buyer = login(&app, BUYER_EMAIL).await;
    place_order(&app, buyer, product.id, 1).await;

    let (status, page) = send(
        &app,
        "GET",
        "/api/v1/products?page=4294967295&per_page=50",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["products"], json!([]));
    assert_eq!(page["total"], json!(1));

    let admin = login(&app, ADMIN_EMAIL).await;
    let (status, page) = send(
        &app,
        "GET",
        "/api/v1/orders?page=4294967295&per_page=50",
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["orders"], json!([]));
    assert_eq!(page["total"], json!(1));
}

#[tokio::test]
async fn test_payments_disabled_when_provider_configured() {
    let mut config = test_config();
    config.paypal_client_id = Some("live-client-id".into());
    let (app, _store, product) = test_app_with(config).await;
    let buyer = login(&app, BUYER_EMAIL).await;

    let (status, body) = send(&app, "GET", "/api/v1/config/paypal", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientId"], json!("live-client-id"));

    let order = place_order(&app, buyer, product.id, 1).await;
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/orders/{}/pay/test", order["id"].as_str().unwrap()),
        Some(buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
