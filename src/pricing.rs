//! Order pricing

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Pricing constants. Configuration, not contract: orders above the
/// free-shipping threshold ship free, everything else pays the flat rate.
#[derive(Clone, Debug)]
pub struct PricingRules {
    pub free_shipping_threshold: Decimal,
    pub shipping_flat: Decimal,
    pub tax_rate: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::new(100, 0),
            shipping_flat: Decimal::new(10, 0),
            tax_rate: Decimal::new(15, 2),
        }
    }
}

/// Totals computed once, server-side, from authoritative unit prices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
}

impl PricingRules {
    /// Quote a set of (unit price, quantity) lines.
    ///
    /// itemsPrice + shippingPrice + taxPrice always equals totalPrice
    /// exactly; every component is rounded to cents before summing.
    pub fn quote<I>(&self, lines: I) -> Totals
    where
        I: IntoIterator<Item = (Decimal, u32)>,
    {
        let items_price: Decimal = lines
            .into_iter()
            .map(|(price, qty)| price * Decimal::from(qty))
            .sum();
        let items_price = round_money(items_price);
        let shipping_price = if items_price > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.shipping_flat
        };
        let tax_price = round_money(items_price * self.tax_rate);
        Totals {
            items_price,
            shipping_price,
            tax_price,
            total_price: items_price + shipping_price + tax_price,
        }
    }
}

/// Round to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a rating aggregate to one decimal place, half away from zero.
pub fn round_rating(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}
