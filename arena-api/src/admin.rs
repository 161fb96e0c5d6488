use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use arena_shared::models::{
    AnalyticsSummary, AuditEntry, Booking, BookingStatus, Role,
};
use arena_shared::pii::Masked;

use crate::error::AppError;
use crate::middleware::auth::{require_role, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub bookings: Vec<Booking>,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub cancelled: usize,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: Masked<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub start_date: String,
    pub end_date: String,
    pub room_id: Option<Uuid>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /admin/dashboard (admin)
pub async fn dashboard(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<DashboardResponse>, AppError> {
    require_role(&claims, &[Role::Admin])?;

    let bookings = state.bookings.list_all().await?;
    let count = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count();

    Ok(Json(DashboardResponse {
        pending: count(BookingStatus::Pending),
        approved: count(BookingStatus::Approved),
        rejected: count(BookingStatus::Rejected),
        cancelled: count(BookingStatus::Cancelled),
        bookings,
    }))
}

/// GET /logs (admin)
pub async fn logs(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    require_role(&claims, &[Role::Admin])?;
    Ok(Json(state.audit.list_recent(200).await?))
}

/// GET /users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    require_role(&claims, &[Role::Admin])?;

    let users = state.users.list_users().await?;
    Ok(Json(
        users
            .into_iter()
            .map(|u| UserSummary {
                id: u.id,
                username: u.username,
                email: Masked(u.email),
                role: u.role,
                created_at: u.created_at,
            })
            .collect(),
    ))
}

/// PUT /users/{id}/role (admin)
pub async fn update_role(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_role(&claims, &[Role::Admin])?;

    if !state.users.update_role(id, req.role).await? {
        return Err(AppError::NotFoundError(format!("user {} not found", id)));
    }

    if let Err(e) = state
        .audit
        .append(
            "user.role_changed",
            &format!("user {} set to {} by {}", id, req.role.as_str(), claims.sub),
        )
        .await
    {
        tracing::error!("audit append failed: {}", e);
    }

    Ok(Json(json!({ "message": "Role updated" })))
}

/// GET /analytics?startDate&endDate&roomId (admin)
pub async fn analytics(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    require_role(&claims, &[Role::Admin])?;

    let start = parse_date(&query.start_date)?;
    // End date is inclusive in the query, half-open in the scan.
    let end = parse_date(&query.end_date)? + Duration::days(1);
    if start >= end {
        return Err(AppError::ValidationError("startDate must not be after endDate".into()));
    }

    Ok(Json(state.bookings.analytics(start, end, query.room_id).await?))
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, AppError> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError(format!("invalid date: {}", s)))?;
    Ok(DateTime::from_naive_utc_and_offset(date.and_time(chrono::NaiveTime::MIN), Utc))
}
