use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub room_id: Uuid,
    pub room_name: String,
    pub score: f64,
    pub avg_rating: f64,
    pub times_booked: i64,
}

/// GET /recommendations — historical-frequency + rating ranking, cached
/// per user. Cache trouble degrades to a recompute, never to a failure.
pub async fn recommendations(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Recommendation>>, AppError> {
    let cache_key = format!("recommendations:{}", claims.sub);

    match state.redis.cache_get(&cache_key).await {
        Ok(Some(cached)) => {
            if let Ok(list) = serde_json::from_str::<Vec<Recommendation>>(&cached) {
                return Ok(Json(list));
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("recommendation cache read failed: {}", e),
    }

    let rooms = state.rooms.list_rooms().await?;
    let ratings: HashMap<Uuid, f64> =
        state.reviews.rating_averages().await?.into_iter().collect();
    let frequencies: HashMap<Uuid, i64> = state
        .bookings
        .booking_counts_for_user(claims.sub)
        .await?
        .into_iter()
        .collect();

    let cfg = &state.recommendation;
    let mut ranked: Vec<Recommendation> = rooms
        .into_iter()
        .map(|room| {
            let times_booked = frequencies.get(&room.id).copied().unwrap_or(0);
            let avg_rating = ratings.get(&room.id).copied().unwrap_or(0.0);
            Recommendation {
                room_id: room.id,
                room_name: room.name,
                score: cfg.frequency_weight * times_booked as f64
                    + cfg.rating_weight * avg_rating,
                avg_rating,
                times_booked,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(cfg.max_results);

    match serde_json::to_string(&ranked) {
        Ok(serialized) => {
            if let Err(e) = state
                .redis
                .cache_set_ex(&cache_key, &serialized, cfg.cache_ttl_seconds)
                .await
            {
                tracing::warn!("recommendation cache write failed: {}", e);
            }
        }
        Err(e) => tracing::warn!("recommendation serialization failed: {}", e),
    }

    Ok(Json(ranked))
}
