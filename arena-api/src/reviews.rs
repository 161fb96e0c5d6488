use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use arena_shared::models::{Review, ReviewWithAuthor};

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub room_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoomReviewsResponse {
    pub reviews: Vec<ReviewWithAuthor>,
    pub avg_rating: f64,
}

/// POST /reviews (auth)
pub async fn create_review(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::ValidationError("rating must be between 1 and 5".into()));
    }
    if let Some(comment) = &req.comment {
        if comment.chars().count() > state.rules.comment_max_chars {
            return Err(AppError::ValidationError(format!(
                "comment must not exceed {} characters",
                state.rules.comment_max_chars
            )));
        }
    }
    if state.rooms.find_room(req.room_id).await?.is_none() {
        return Err(AppError::NotFoundError(format!("room {} not found", req.room_id)));
    }

    state
        .reviews
        .insert(Review {
            id: Uuid::new_v4(),
            room_id: req.room_id,
            user_id: claims.sub,
            rating: req.rating,
            comment: req.comment,
            created_at: Utc::now(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "message": "Review saved" }))))
}

/// GET /reviews/{room_id} — public listing with the aggregate average.
pub async fn room_reviews(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomReviewsResponse>, AppError> {
    let reviews = state.reviews.list_for_room(room_id).await?;
    let avg_rating = state.reviews.average_rating(room_id).await?.unwrap_or(0.0);

    Ok(Json(RoomReviewsResponse { reviews, avg_rating }))
}
