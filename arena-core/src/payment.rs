use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arena_shared::models::PaymentMethod;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The provider has no programmatic path for the requested
    /// capability (e.g. refunding a bank transfer). Surfaces as 501.
    #[error("unsupported payment operation: {0}")]
    Unsupported(String),

    #[error("payment provider failure: {0}")]
    Provider(String),
}

/// Handle obtained from a payment provider for one booking total. The
/// booking id is the correlation id and is carried through provider
/// metadata; handles themselves are not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentHandle {
    pub method: PaymentMethod,
    pub reference: String,
    pub amount: f64,
    pub currency: String,
    /// Hosted checkout / wallet redirect target, when the provider has
    /// one.
    pub redirect_url: Option<String>,
    /// Locally generated scannable payload (bank transfer).
    pub qr_payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub method: PaymentMethod,
    pub reference: String,
    pub amount: f64,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn method(&self) -> PaymentMethod;

    /// Obtain a payment handle for the given amount, tagged with the
    /// booking id so the asynchronous confirmation can be matched back.
    async fn create_intent(
        &self,
        booking_id: Uuid,
        amount: f64,
        currency: &str,
        description: &str,
    ) -> Result<PaymentHandle, PaymentError>;

    async fn refund(&self, reference: &str, amount: f64) -> Result<RefundOutcome, PaymentError>;
}
