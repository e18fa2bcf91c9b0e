//! Environment configuration

use std::str::FromStr;

use thiserror::Error;

use crate::pricing::PricingRules;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration, read once at startup. `DATABASE_URL` selects the
/// Postgres backend; without it the service runs on the in-memory store.
/// Without `PAYPAL_CLIENT_ID` the payment-capture bypass path is enabled.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub nats_url: Option<String>,
    pub paypal_client_id: Option<String>,
    pub pricing: PricingRules,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Tests feed a map in here so
    /// they never have to mutate process-global environment state.
    fn load(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = PricingRules::default();
        Ok(Self {
            port: parse_or(&var, "PORT", 8080)?,
            database_url: non_empty(var("DATABASE_URL")),
            nats_url: non_empty(var("NATS_URL")),
            paypal_client_id: non_empty(var("PAYPAL_CLIENT_ID")),
            pricing: PricingRules {
                free_shipping_threshold: parse_or(
                    &var,
                    "FREE_SHIPPING_THRESHOLD",
                    defaults.free_shipping_threshold,
                )?,
                shipping_flat: parse_or(&var, "SHIPPING_FLAT", defaults.shipping_flat)?,
                tax_rate: parse_or(&var, "TAX_RATE", defaults.tax_rate)?,
            },
        })
    }

    /// The synthetic-capture path is only available in environments without
    /// live payment-provider connectivity.
    pub fn test_pay_enabled(&self) -> bool {
        self.paypal_client_id.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
