use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use arena_core::repository::{RepoError, ReviewRepository};
use arena_shared::models::{Review, ReviewWithAuthor};

pub struct StoreReviewRepository {
    pool: PgPool,
}

impl StoreReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewWithAuthorRow {
    id: Uuid,
    room_id: Uuid,
    username: String,
    rating: i32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl ReviewRepository for StoreReviewRepository {
    async fn insert(&self, review: Review) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, room_id, user_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(review.id)
        .bind(review.room_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_room(&self, room_id: Uuid) -> Result<Vec<ReviewWithAuthor>, RepoError> {
        let rows = sqlx::query_as::<_, ReviewWithAuthorRow>(
            r#"
            SELECT rv.id, rv.room_id, u.username, rv.rating, rv.comment, rv.created_at
            FROM reviews rv
            INNER JOIN users u ON u.id = rv.user_id
            WHERE rv.room_id = $1
            ORDER BY rv.created_at DESC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ReviewWithAuthor {
                id: row.id,
                room_id: row.room_id,
                username: row.username,
                rating: row.rating,
                comment: row.comment,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn average_rating(&self, room_id: Uuid) -> Result<Option<f64>, RepoError> {
        let avg: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(rating)::double precision FROM reviews WHERE room_id = $1",
        )
        .bind(room_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(avg)
    }

    async fn rating_averages(&self) -> Result<Vec<(Uuid, f64)>, RepoError> {
        let rows: Vec<(Uuid, f64)> = sqlx::query_as(
            "SELECT room_id, AVG(rating)::double precision FROM reviews GROUP BY room_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
