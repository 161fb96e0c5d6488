use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use arena_shared::models::{Feature, Role, Room};

use crate::error::AppError;
use crate::middleware::auth::{require_role, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub capacity: i32,
    pub price_per_hour: f64,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFeatureRequest {
    pub room_id: Uuid,
    pub name: String,
    pub price: f64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /rooms
pub async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(state.rooms.list_rooms().await?))
}

/// POST /rooms (admin)
pub async fn create_room(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    require_role(&claims, &[Role::Admin])?;

    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("room name is required".into()));
    }
    if req.capacity <= 0 || req.price_per_hour < 0.0 {
        return Err(AppError::ValidationError(
            "capacity must be positive and rate non-negative".into(),
        ));
    }

    let room = Room {
        id: Uuid::new_v4(),
        name: req.name,
        capacity: req.capacity,
        price_per_hour: req.price_per_hour,
        lat: req.lat,
        lng: req.lng,
        created_at: Utc::now(),
    };
    state.rooms.create_room(room.clone()).await?;

    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /features/{room_id}
pub async fn list_features(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<Feature>>, AppError> {
    Ok(Json(state.rooms.list_features(room_id).await?))
}

/// POST /features (admin)
pub async fn create_feature(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreateFeatureRequest>,
) -> Result<(StatusCode, Json<Feature>), AppError> {
    require_role(&claims, &[Role::Admin])?;

    if req.name.trim().is_empty() || req.price < 0.0 {
        return Err(AppError::ValidationError(
            "feature name is required and price must be non-negative".into(),
        ));
    }
    if state.rooms.find_room(req.room_id).await?.is_none() {
        return Err(AppError::NotFoundError(format!("room {} not found", req.room_id)));
    }

    let feature = Feature {
        id: Uuid::new_v4(),
        room_id: req.room_id,
        name: req.name,
        price: req.price,
    };
    state.rooms.create_feature(feature.clone()).await?;

    Ok((StatusCode::CREATED, Json(feature)))
}
