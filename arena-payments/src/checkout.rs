use async_trait::async_trait;
use uuid::Uuid;

use arena_core::payment::{PaymentError, PaymentHandle, PaymentProvider, RefundOutcome};
use arena_shared::models::PaymentMethod;

/// Card-network hosted checkout session. The session id carries the
/// booking id so the provider webhook can be matched back without
/// persisting handles.
pub struct CardCheckoutProvider {
    checkout_base_url: String,
}

impl CardCheckoutProvider {
    pub fn new(checkout_base_url: impl Into<String>) -> Self {
        Self { checkout_base_url: checkout_base_url.into() }
    }
}

#[async_trait]
impl PaymentProvider for CardCheckoutProvider {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Card
    }

    async fn create_intent(
        &self,
        booking_id: Uuid,
        amount: f64,
        currency: &str,
        description: &str,
    ) -> Result<PaymentHandle, PaymentError> {
        let reference = format!("cs_{}", booking_id.simple());
        let redirect_url = format!("{}/{}", self.checkout_base_url, reference);
        tracing::info!(%booking_id, %reference, amount, currency, description, "checkout session created");
        Ok(PaymentHandle {
            method: PaymentMethod::Card,
            reference,
            amount,
            currency: currency.to_string(),
            redirect_url: Some(redirect_url),
            qr_payload: None,
            created_at: chrono::Utc::now(),
        })
    }

    async fn refund(&self, reference: &str, amount: f64) -> Result<RefundOutcome, PaymentError> {
        tracing::info!(reference, amount, "card refund submitted");
        Ok(RefundOutcome {
            method: PaymentMethod::Card,
            reference: reference.to_string(),
            amount,
        })
    }
}
