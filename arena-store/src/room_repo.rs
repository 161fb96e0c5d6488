use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use arena_core::repository::{RepoError, RoomRepository};
use arena_shared::models::{Feature, Room};

pub struct StoreRoomRepository {
    pool: PgPool,
}

impl StoreRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    name: String,
    capacity: i32,
    price_per_hour: f64,
    lat: Option<f64>,
    lng: Option<f64>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            name: row.name,
            capacity: row.capacity,
            price_per_hour: row.price_per_hour,
            lat: row.lat,
            lng: row.lng,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FeatureRow {
    id: Uuid,
    room_id: Uuid,
    name: String,
    price: f64,
}

impl From<FeatureRow> for Feature {
    fn from(row: FeatureRow) -> Self {
        Feature { id: row.id, room_id: row.room_id, name: row.name, price: row.price }
    }
}

#[async_trait]
impl RoomRepository for StoreRoomRepository {
    async fn create_room(&self, room: Room) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, name, capacity, price_per_hour, lat, lng, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(room.id)
        .bind(&room.name)
        .bind(room.capacity)
        .bind(room.price_per_hour)
        .bind(room.lat)
        .bind(room.lng)
        .bind(room.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_room(&self, id: Uuid) -> Result<Option<Room>, RepoError> {
        let row = sqlx::query_as::<_, RoomRow>(
            "SELECT id, name, capacity, price_per_hour, lat, lng, created_at FROM rooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Room::from))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RepoError> {
        let rows = sqlx::query_as::<_, RoomRow>(
            "SELECT id, name, capacity, price_per_hour, lat, lng, created_at FROM rooms ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn create_feature(&self, feature: Feature) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO features (id, room_id, name, price) VALUES ($1, $2, $3, $4)")
            .bind(feature.id)
            .bind(feature.room_id)
            .bind(&feature.name)
            .bind(feature.price)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_features(&self, room_id: Uuid) -> Result<Vec<Feature>, RepoError> {
        let rows = sqlx::query_as::<_, FeatureRow>(
            "SELECT id, room_id, name, price FROM features WHERE room_id = $1 ORDER BY name",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Feature::from).collect())
    }

    async fn find_features_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Feature>, RepoError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        // Ids that no longer exist simply produce no row.
        let rows = sqlx::query_as::<_, FeatureRow>(
            "SELECT id, room_id, name, price FROM features WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Feature::from).collect())
    }
}
