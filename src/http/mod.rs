//! HTTP surface
//!
//! Routes live under `/api/v1`. Handlers validate request DTOs at the
//! boundary and delegate to the domain and store layers; errors flow back
//! as `{"message": …}` responses via [`ApiError`].

pub mod cart;
pub mod extract;
pub mod orders;
pub mod products;
pub mod users;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domain::DomainEvent;
use crate::payment::{PayPalGateway, PaymentGateway};
use crate::session::SessionStore;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: SessionStore,
    pub gateway: Arc<dyn PaymentGateway>,
    pub config: Config,
    pub nats: Option<async_nats::Client>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config, nats: Option<async_nats::Client>) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            gateway: Arc::new(PayPalGateway),
            config,
            nats,
        }
    }

    /// Publish a domain event after its state change has committed.
    /// Fire-and-forget: publishing is never load-bearing.
    pub(crate) async fn publish(&self, event: impl Into<DomainEvent>) {
        let Some(nats) = &self.nats else { return };
        let event = event.into();
        match serde_json::to_vec(&event) {
            Ok(payload) => {
                if let Err(err) = nats.publish(event.subject(), payload.into()).await {
                    tracing::warn!(%err, subject = event.subject(), "event publish failed");
                }
            }
            Err(err) => tracing::warn!(%err, "event serialization failed"),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(users::create_session))
        .route("/users", post(users::register))
        .route("/users/auth", post(users::login))
        .route("/users/logout", post(users::logout))
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/:id/reviews", post(products::add_review))
        .route("/config/paypal", get(paypal_config))
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/items", put(cart::set_item))
        .route("/cart/items/:product_id", delete(cart::remove_item))
        .route("/cart/shipping", put(cart::set_shipping))
        .route("/cart/payment", put(cart::set_payment))
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/orders/mine", get(orders::list_my_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/pay", put(orders::pay_order))
        .route("/orders/:id/pay/test", put(orders::pay_order_test))
        .route("/orders/:id/deliver", put(orders::deliver_order))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "storefront-api" }))
}

/// Client id for the provider's checkout widget.
async fn paypal_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "clientId": state.config.paypal_client_id
    }))
}
