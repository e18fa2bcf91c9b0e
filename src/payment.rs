//! Payment capture validation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::PaymentResult;

/// Transaction id stamped on captures minted by the sandbox gateway.
pub const TEST_TRANSACTION_ID: &str = "TEST_TRANSACTION_123";

const CAPTURE_COMPLETED: &str = "COMPLETED";

/// A capture as the provider reports it back through the client. Field
/// names follow the provider's wire format.
#[derive(Clone, Debug, Deserialize)]
pub struct PaymentConfirmation {
    pub id: String,
    pub status: String,
    pub update_time: DateTime<Utc>,
    pub payer: Payer,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Payer {
    pub email_address: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("capture was not completed (status {0})")]
    Incomplete(String),
}

/// Seam between order handlers and the payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Validate a client-reported capture and turn it into the payment
    /// record stored on the order.
    async fn confirm(&self, confirmation: PaymentConfirmation) -> Result<PaymentResult, PaymentError>;
}

/// Accepts exactly the captures the provider reports as completed.
pub struct PayPalGateway;

#[async_trait]
impl PaymentGateway for PayPalGateway {
    async fn confirm(&self, confirmation: PaymentConfirmation) -> Result<PaymentResult, PaymentError> {
        if confirmation.status != CAPTURE_COMPLETED {
            return Err(PaymentError::Incomplete(confirmation.status));
        }
        Ok(PaymentResult {
            transaction_id: confirmation.id,
            status: confirmation.status,
            update_time: confirmation.update_time,
            email: confirmation.payer.email_address,
        })
    }
}

/// Stand-in for environments without provider credentials. Mints
/// pre-completed captures for the test payment route; those still run
/// through [`PaymentGateway::confirm`] like any other capture.
pub struct SandboxGateway;

impl SandboxGateway {
    pub fn synthesize(payer_email: &str) -> PaymentConfirmation {
        PaymentConfirmation {
            id: TEST_TRANSACTION_ID.to_string(),
            status: CAPTURE_COMPLETED.to_string(),
            update_time: Utc::now(),
            payer: Payer {
                email_address: payer_email.to_string(),
            },
        }
    }
}
