use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use arena_booking::BookingRequest;
use arena_core::payment::PaymentHandle;
use arena_shared::models::{Booking, PublicBooking, Role};

use crate::error::{engine_error, AppError};
use crate::middleware::auth::{require_role, Claims};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub message: String,
    pub total: f64,
    pub payment_handles: Vec<PaymentHandle>,
}

/// GET /public/bookings — approved bookings joined with room names, no
/// auth (public occupancy calendar).
pub async fn public_bookings(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicBooking>>, AppError> {
    Ok(Json(state.bookings.list_public_approved().await?))
}

/// POST /bookings/request (citizen)
pub async fn request_booking(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    require_role(&claims, &[Role::Citizen])?;

    let booking = state
        .engine
        .request_booking(claims.sub, req)
        .await
        .map_err(engine_error)?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /bookings — the caller's own bookings.
pub async fn my_bookings(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_for_user(claims.sub).await?))
}

/// PUT /bookings/{id}/approve (admin/manager)
pub async fn approve_booking(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
) -> Result<Json<ApprovalResponse>, AppError> {
    require_role(&claims, &[Role::Admin, Role::Manager])?;

    let outcome = state
        .engine
        .approve_booking(claims.sub, id)
        .await
        .map_err(engine_error)?;

    Ok(Json(ApprovalResponse {
        message: "Approved, invoice generated".into(),
        total: outcome.total,
        payment_handles: outcome.payment_handles,
    }))
}

/// PUT /bookings/{id}/reject (admin/manager)
pub async fn reject_booking(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_role(&claims, &[Role::Admin, Role::Manager])?;

    state
        .engine
        .reject_booking(claims.sub, id)
        .await
        .map_err(engine_error)?;

    Ok(Json(json!({ "message": "Rejected" })))
}

/// POST /bookings/{id}/refund (admin/manager)
pub async fn refund_booking(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_role(&claims, &[Role::Admin, Role::Manager])?;

    state
        .engine
        .refund_booking(claims.sub, id)
        .await
        .map_err(engine_error)?;

    Ok(Json(json!({ "message": "Refund initiated" })))
}
