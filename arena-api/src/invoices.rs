use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

/// GET /invoices/{id} — the stored artifact as a download, addressed
/// by booking id.
pub async fn download_invoice(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, HeaderMap, String), AppError> {
    let invoice = state
        .invoices
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("invoice for booking {} not found", id)))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    let disposition = format!("attachment; filename=\"invoice-{}.txt\"", id);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::Anyhow(anyhow::anyhow!("header encoding failed: {}", e)))?,
    );

    Ok((StatusCode::OK, headers, invoice.document))
}
