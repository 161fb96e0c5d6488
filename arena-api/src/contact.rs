use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// POST /contact — unauthenticated message relay to the booking office.
pub async fn contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.message.trim().is_empty() {
        return Err(AppError::ValidationError("name, email and message are required".into()));
    }

    state
        .notifier
        .relay_contact(&req.name, &req.email, &req.message)
        .await
        .map_err(|e| AppError::ExternalServiceError(e.to_string()))?;

    Ok(Json(json!({ "message": "Sent" })))
}
