//! Order aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::pricing::Totals;

/// An immutable-once-created record of a purchase and its fulfillment
/// status. Mutated exactly twice over its life: payment capture sets
/// `is_paid`, the admin delivery transition sets `is_delivered`.
///
/// ```text
/// CREATED --capture success--> PAID --admin deliver--> DELIVERED
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(flatten)]
    pub totals: Totals,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentResult>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Price-and-quantity snapshot of one product. Decoupled from the live
/// product record: later catalog edits never alter placed orders.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub qty: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    PayPal,
    Stripe,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Stripe => "Stripe",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PayPal" => Ok(PaymentMethod::PayPal),
            "Stripe" => Ok(PaymentMethod::Stripe),
            _ => Err(()),
        }
    }
}

/// Provider transaction metadata, recorded once on successful capture.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub transaction_id: String,
    pub status: String,
    pub update_time: DateTime<Utc>,
    pub email: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("order must contain at least one item")]
    Empty,
    #[error("item quantity must be at least 1")]
    ZeroQuantity,
    #[error("order is already paid")]
    AlreadyPaid,
    #[error("order is not paid")]
    NotPaid,
    #[error("order is already delivered")]
    AlreadyDelivered,
}

impl Order {
    /// Assemble a new order in the unpaid, undelivered state.
    pub fn create(
        user_id: Uuid,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        totals: Totals,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::Empty);
        }
        if items.iter().any(|i| i.qty == 0) {
            return Err(OrderError::ZeroQuantity);
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            user_id,
            items,
            shipping_address,
            payment_method,
            totals,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// CREATED -> PAID. Double capture is rejected and leaves the order
    /// untouched.
    pub fn mark_paid(&mut self, result: PaymentResult, at: DateTime<Utc>) -> Result<(), OrderError> {
        if self.is_paid {
            return Err(OrderError::AlreadyPaid);
        }
        self.is_paid = true;
        self.paid_at = Some(at);
        self.payment_result = Some(result);
        self.updated_at = at;
        Ok(())
    }

    /// PAID -> DELIVERED. One-way; never reachable from CREATED.
    pub fn mark_delivered(&mut self, at: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.is_paid {
            return Err(OrderError::NotPaid);
        }
        if self.is_delivered {
            return Err(OrderError::AlreadyDelivered);
        }
        self.is_delivered = true;
        self.delivered_at = Some(at);
        self.updated_at = at;
        Ok(())
    }
}
