use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use arena_shared::models::PaymentMethod;

use crate::error::{engine_error, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentWebhookEvent {
    pub booking_id: Uuid,
    pub provider: String,
    pub status: String,
    pub reference: Option<String>,
}

/// POST /webhook — provider-signed payment confirmation. The signature
/// is verified over the raw body before any parsing; unmatched booking
/// ids are acknowledged anyway so the provider stops retrying.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = headers
        .get("x-webhook-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("missing webhook signature".into()))?;

    if !verify_signature(&state.webhook_secret, &body, signature) {
        return Err(AppError::AuthenticationError("invalid webhook signature".into()));
    }

    let event: PaymentWebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::ValidationError(format!("malformed webhook payload: {}", e)))?;

    tracing::info!(
        booking_id = %event.booking_id,
        provider = %event.provider,
        status = %event.status,
        reference = event.reference.as_deref().unwrap_or(""),
        "payment webhook received"
    );

    let method = PaymentMethod::parse(&event.provider).ok_or_else(|| {
        AppError::ValidationError(format!("unknown payment provider: {}", event.provider))
    })?;

    state
        .engine
        .reconcile_payment(event.booking_id, method, &event.status)
        .await
        .map_err(engine_error)?;

    Ok(StatusCode::OK)
}

/// Expected header: `sha256=<hex digest of secret || body>`.
fn verify_signature(secret: &str, body: &[u8], header_value: &str) -> bool {
    let presented = header_value.strip_prefix("sha256=").unwrap_or(header_value);

    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(body);
    let expected = hex_encode(&hasher.finalize());

    presented.eq_ignore_ascii_case(&expected)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hasher.update(body);
        format!("sha256={}", hex_encode(&hasher.finalize()))
    }

    #[test]
    fn valid_signature_is_accepted() {
        let body = br#"{"booking_id":"x","provider":"card","status":"completed"}"#;
        let header = sign("secret", body);
        assert!(verify_signature("secret", body, &header));
    }

    #[test]
    fn wrong_secret_or_tampered_body_is_rejected() {
        let body = br#"{"status":"completed"}"#;
        let header = sign("secret", body);
        assert!(!verify_signature("other-secret", body, &header));
        assert!(!verify_signature("secret", br#"{"status":"refunded"}"#, &header));
    }

    #[test]
    fn prefix_is_optional_and_case_insensitive() {
        let body = b"payload";
        let header = sign("secret", body);
        let bare = header.strip_prefix("sha256=").unwrap().to_uppercase();
        assert!(verify_signature("secret", body, &bare));
    }
}
