use std::sync::Arc;

use uuid::Uuid;

use arena_core::payment::{PaymentError, PaymentHandle, PaymentProvider, RefundOutcome};
use arena_shared::models::PaymentMethod;

/// Fans a booking total out to every configured provider and routes
/// refunds back to the provider recorded on the booking. Provider
/// specifics never leak past this type.
pub struct PaymentOrchestrator {
    providers: Vec<Arc<dyn PaymentProvider>>,
}

impl PaymentOrchestrator {
    pub fn new(providers: Vec<Arc<dyn PaymentProvider>>) -> Self {
        Self { providers }
    }

    /// Obtain one handle per provider. A failing provider is logged and
    /// skipped; the call only fails when no provider produced a handle.
    pub async fn issue_handles(
        &self,
        booking_id: Uuid,
        amount: f64,
        currency: &str,
        description: &str,
    ) -> Result<Vec<PaymentHandle>, PaymentError> {
        let mut handles = Vec::new();
        for provider in &self.providers {
            match provider.create_intent(booking_id, amount, currency, description).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::error!(
                        method = provider.method().as_str(),
                        %booking_id,
                        "payment intent failed: {}",
                        e
                    );
                }
            }
        }
        if handles.is_empty() {
            return Err(PaymentError::Provider(format!(
                "no provider issued a handle for booking {}",
                booking_id
            )));
        }
        Ok(handles)
    }

    /// Dispatch a refund through the provider matching the recorded
    /// payment method.
    pub async fn refund(
        &self,
        method: PaymentMethod,
        reference: &str,
        amount: f64,
    ) -> Result<RefundOutcome, PaymentError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.method() == method)
            .ok_or_else(|| {
                PaymentError::Unsupported(format!(
                    "no provider configured for method {}",
                    method.as_str()
                ))
            })?;
        provider.refund(reference, amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BankTransferConfig, BankTransferProvider, CardCheckoutProvider, WalletRedirectProvider};

    fn orchestrator() -> PaymentOrchestrator {
        PaymentOrchestrator::new(vec![
            Arc::new(CardCheckoutProvider::new("https://pay.example/checkout")),
            Arc::new(WalletRedirectProvider::new("https://wallet.example/redirect")),
            Arc::new(BankTransferProvider::new(BankTransferConfig {
                beneficiary: "Stadt Musterstadt Sportamt".into(),
                iban: "DE02120300000000202051".into(),
                bic: "BYLADEM1001".into(),
            })),
        ])
    }

    #[tokio::test]
    async fn issues_one_handle_per_provider() {
        let booking_id = Uuid::new_v4();
        let handles = orchestrator()
            .issue_handles(booking_id, 55.0, "EUR", "Sporthalle A")
            .await
            .unwrap();
        assert_eq!(handles.len(), 3);

        let methods: Vec<PaymentMethod> = handles.iter().map(|h| h.method).collect();
        assert!(methods.contains(&PaymentMethod::Card));
        assert!(methods.contains(&PaymentMethod::Wallet));
        assert!(methods.contains(&PaymentMethod::BankTransfer));

        for h in &handles {
            assert_eq!(h.amount, 55.0);
            assert!(h.reference.contains(&booking_id.simple().to_string()));
        }
    }

    #[tokio::test]
    async fn card_and_wallet_refund_succeed() {
        let orch = orchestrator();
        for method in [PaymentMethod::Card, PaymentMethod::Wallet] {
            let outcome = orch.refund(method, "ref-1", 40.0).await.unwrap();
            assert_eq!(outcome.method, method);
            assert_eq!(outcome.amount, 40.0);
        }
    }

    #[tokio::test]
    async fn bank_transfer_refund_is_unsupported() {
        let err = orchestrator()
            .refund(PaymentMethod::BankTransfer, "ref-1", 40.0)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Unsupported(_)));
    }
}
