//! Domain events

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Events emitted after a state change has committed. Serialized to JSON
/// and published on the subject returned by [`DomainEvent::subject`].
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid },
    Reviewed { product_id: Uuid, rating: u8, num_reviews: u32 },
    StockAdjusted { product_id: Uuid, count_in_stock: u32 },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, user_id: Uuid, total: Decimal },
    Paid { order_id: Uuid, transaction_id: String },
    Delivered { order_id: Uuid },
}

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            DomainEvent::Product(ProductEvent::Created { .. }) => "storefront.products.created",
            DomainEvent::Product(ProductEvent::Reviewed { .. }) => "storefront.products.reviewed",
            DomainEvent::Product(ProductEvent::StockAdjusted { .. }) => {
                "storefront.products.stock_adjusted"
            }
            DomainEvent::Order(OrderEvent::Placed { .. }) => "storefront.orders.placed",
            DomainEvent::Order(OrderEvent::Paid { .. }) => "storefront.orders.paid",
            DomainEvent::Order(OrderEvent::Delivered { .. }) => "storefront.orders.delivered",
        }
    }
}

impl From<ProductEvent> for DomainEvent {
    fn from(event: ProductEvent) -> Self {
        DomainEvent::Product(event)
    }
}

impl From<OrderEvent> for DomainEvent {
    fn from(event: OrderEvent) -> Self {
        DomainEvent::Order(event)
    }
}
