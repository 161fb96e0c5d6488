use async_trait::async_trait;
use uuid::Uuid;

use arena_core::payment::{PaymentError, PaymentHandle, PaymentProvider, RefundOutcome};
use arena_shared::models::PaymentMethod;

/// Wallet-style redirect flow: the citizen is sent to the wallet page
/// and the wallet calls back asynchronously.
pub struct WalletRedirectProvider {
    redirect_base_url: String,
}

impl WalletRedirectProvider {
    pub fn new(redirect_base_url: impl Into<String>) -> Self {
        Self { redirect_base_url: redirect_base_url.into() }
    }
}

#[async_trait]
impl PaymentProvider for WalletRedirectProvider {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Wallet
    }

    async fn create_intent(
        &self,
        booking_id: Uuid,
        amount: f64,
        currency: &str,
        description: &str,
    ) -> Result<PaymentHandle, PaymentError> {
        let reference = format!("wlt_{}", booking_id.simple());
        let redirect_url = format!(
            "{}?ref={}&amount={:.2}&currency={}",
            self.redirect_base_url, reference, amount, currency
        );
        tracing::info!(%booking_id, %reference, amount, description, "wallet redirect prepared");
        Ok(PaymentHandle {
            method: PaymentMethod::Wallet,
            reference,
            amount,
            currency: currency.to_string(),
            redirect_url: Some(redirect_url),
            qr_payload: None,
            created_at: chrono::Utc::now(),
        })
    }

    async fn refund(&self, reference: &str, amount: f64) -> Result<RefundOutcome, PaymentError> {
        tracing::info!(reference, amount, "wallet refund submitted");
        Ok(RefundOutcome {
            method: PaymentMethod::Wallet,
            reference: reference.to_string(),
            amount,
        })
    }
}
