use async_trait::async_trait;
use uuid::Uuid;

use arena_core::payment::{PaymentError, PaymentHandle, PaymentProvider, RefundOutcome};
use arena_shared::models::PaymentMethod;

#[derive(Debug, Clone)]
pub struct BankTransferConfig {
    pub beneficiary: String,
    pub iban: String,
    pub bic: String,
}

/// Static bank-transfer payload, generated locally (EPC069-12 "Girocode"
/// text). Not provider-backed: incoming transfers are reconciled
/// manually by the booking office, and there is no programmatic refund
/// path.
pub struct BankTransferProvider {
    config: BankTransferConfig,
}

impl BankTransferProvider {
    pub fn new(config: BankTransferConfig) -> Self {
        Self { config }
    }

    /// EPC QR payload: service tag, version, charset, SCT identifier,
    /// BIC, beneficiary, IBAN, amount, then the remittance line that
    /// carries the booking reference.
    pub fn epc_payload(&self, reference: &str, amount: f64, currency: &str) -> String {
        [
            "BCD",
            "002",
            "1",
            "SCT",
            &self.config.bic,
            &self.config.beneficiary,
            &self.config.iban,
            &format!("{}{:.2}", currency, amount),
            "",
            reference,
            "",
        ]
        .join("\n")
    }
}

#[async_trait]
impl PaymentProvider for BankTransferProvider {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::BankTransfer
    }

    async fn create_intent(
        &self,
        booking_id: Uuid,
        amount: f64,
        currency: &str,
        description: &str,
    ) -> Result<PaymentHandle, PaymentError> {
        let reference = format!("sepa_{}", booking_id.simple());
        let qr_payload = self.epc_payload(&reference, amount, currency);
        tracing::info!(%booking_id, %reference, amount, description, "bank transfer payload generated");
        Ok(PaymentHandle {
            method: PaymentMethod::BankTransfer,
            reference,
            amount,
            currency: currency.to_string(),
            redirect_url: None,
            qr_payload: Some(qr_payload),
            created_at: chrono::Utc::now(),
        })
    }

    async fn refund(&self, reference: &str, _amount: f64) -> Result<RefundOutcome, PaymentError> {
        Err(PaymentError::Unsupported(format!(
            "bank transfer {} must be refunded manually",
            reference
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> BankTransferProvider {
        BankTransferProvider::new(BankTransferConfig {
            beneficiary: "Stadt Musterstadt Sportamt".into(),
            iban: "DE02120300000000202051".into(),
            bic: "BYLADEM1001".into(),
        })
    }

    #[test]
    fn epc_payload_shape() {
        let payload = provider().epc_payload("sepa_abc", 55.5, "EUR");
        let lines: Vec<&str> = payload.split('\n').collect();
        assert_eq!(lines[0], "BCD");
        assert_eq!(lines[3], "SCT");
        assert_eq!(lines[5], "Stadt Musterstadt Sportamt");
        assert_eq!(lines[6], "DE02120300000000202051");
        assert_eq!(lines[7], "EUR55.50");
        assert_eq!(lines[9], "sepa_abc");
    }

    #[tokio::test]
    async fn intent_embeds_payload_and_refund_is_unsupported() {
        let p = provider();
        let booking_id = Uuid::new_v4();
        let handle = p.create_intent(booking_id, 40.0, "EUR", "Sporthalle A").await.unwrap();
        assert!(handle.qr_payload.unwrap().contains("EUR40.00"));
        assert!(handle.redirect_url.is_none());

        let err = p.refund(&handle.reference, 40.0).await.unwrap_err();
        assert!(matches!(err, PaymentError::Unsupported(_)));
    }
}
