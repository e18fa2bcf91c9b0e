//! Cart aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::order::{PaymentMethod, ShippingAddress};
use crate::domain::product::Product;
use crate::pricing::{PricingRules, Totals};

/// Per-session shopping cart. Lines snapshot catalog data for display;
/// checkout reprices and revalidates against the live catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: Option<PaymentMethod>,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub qty: u32,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("item quantity must be at least 1")]
    ZeroQuantity,
    #[error("requested {requested} but only {available} in stock")]
    ExceedsStock { requested: u32, available: u32 },
    #[error("item is not in the cart")]
    ItemNotFound,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert or replace the line for `product`, snapshotting its current
    /// name, image and price. The quantity is absolute, not additive, and
    /// may not exceed the stock on hand.
    pub fn set_item(
        &mut self,
        product: &Product,
        qty: u32,
        rules: &PricingRules,
    ) -> Result<(), CartError> {
        if qty == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if qty > product.count_in_stock {
            return Err(CartError::ExceedsStock {
                requested: qty,
                available: product.count_in_stock,
            });
        }
        let line = CartItem {
            product_id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price,
            qty,
        };
        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(existing) => *existing = line,
            None => self.items.push(line),
        }
        self.recalculate(rules);
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: Uuid, rules: &PricingRules) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        self.recalculate(rules);
        Ok(())
    }

    /// Empty the cart. Shipping address and payment method survive so a
    /// follow-up purchase does not re-enter them.
    pub fn clear(&mut self) {
        self.items.clear();
        self.totals = Totals::default();
    }

    pub fn set_shipping_address(&mut self, address: ShippingAddress) {
        self.shipping_address = Some(address);
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = Some(method);
    }

    pub fn recalculate(&mut self, rules: &PricingRules) {
        self.totals = if self.items.is_empty() {
            Totals::default()
        } else {
            rules.quote(self.items.iter().map(|i| (i.price, i.qty)))
        };
    }
}
