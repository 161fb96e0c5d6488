use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use arena_core::repository::{BookingRepository, NewBooking, RepoError};
use arena_shared::models::{
    AnalyticsSummary, Booking, BookingStatus, PaymentMethod, PaymentStatus, PublicBooking,
    RoomBookingCount,
};

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    room_id: Uuid,
    user_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
    payment_status: String,
    payment_method: Option<String>,
    feature_ids: Json<Vec<Uuid>>,
    total_price: Option<f64>,
    calendar_event_ref: Option<String>,
    reminder_sent: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn booking_from_row(row: BookingRow) -> Result<Booking, RepoError> {
    let status = BookingStatus::parse(&row.status)
        .ok_or_else(|| format!("unknown booking status: {}", row.status))?;
    let payment_status = PaymentStatus::parse(&row.payment_status)
        .ok_or_else(|| format!("unknown payment status: {}", row.payment_status))?;
    let payment_method = match row.payment_method.as_deref() {
        Some(m) => {
            Some(PaymentMethod::parse(m).ok_or_else(|| format!("unknown payment method: {}", m))?)
        }
        None => None,
    };

    Ok(Booking {
        id: row.id,
        room_id: row.room_id,
        user_id: row.user_id,
        start_time: row.start_time,
        end_time: row.end_time,
        status,
        payment_status,
        payment_method,
        feature_ids: row.feature_ids.0,
        total_price: row.total_price,
        calendar_event_ref: row.calendar_event_ref,
        reminder_sent: row.reminder_sent,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

const BOOKING_COLUMNS: &str = "id, room_id, user_id, start_time, end_time, status, \
     payment_status, payment_method, feature_ids, total_price, calendar_event_ref, \
     reminder_sent, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PublicBookingRow {
    id: Uuid,
    room_id: Uuid,
    room_name: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn insert(&self, new: NewBooking) -> Result<Booking, RepoError> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            room_id: new.room_id,
            user_id: new.user_id,
            start_time: new.start_time,
            end_time: new.end_time,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            feature_ids: new.feature_ids,
            total_price: None,
            calendar_event_ref: None,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO bookings
                (id, room_id, user_id, start_time, end_time, status, payment_status,
                 feature_ids, reminder_sent, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(booking.id)
        .bind(booking.room_id)
        .bind(booking.user_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(Json(&booking.feature_ids))
        .bind(booking.reminder_sent)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(booking_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY start_time DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(booking_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(booking_from_row).collect()
    }

    async fn list_public_approved(&self) -> Result<Vec<PublicBooking>, RepoError> {
        let rows = sqlx::query_as::<_, PublicBookingRow>(
            r#"
            SELECT b.id, b.room_id, r.name AS room_name, b.start_time, b.end_time
            FROM bookings b
            INNER JOIN rooms r ON r.id = b.room_id
            WHERE b.status = 'approved'
            ORDER BY b.start_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PublicBooking {
                id: row.id,
                room_id: row.room_id,
                room_name: row.room_name,
                start_time: row.start_time,
                end_time: row.end_time,
            })
            .collect())
    }

    async fn list_approved_for_room(&self, room_id: Uuid) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE room_id = $1 AND status = 'approved'",
            BOOKING_COLUMNS
        ))
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(booking_from_row).collect()
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<(), RepoError> {
        sqlx::query("UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_payment(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        payment_method: Option<PaymentMethod>,
    ) -> Result<(), RepoError> {
        sqlx::query(
            "UPDATE bookings SET payment_status = $1, payment_method = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(payment_status.as_str())
        .bind(payment_method.map(|m| m.as_str()))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_total(&self, id: Uuid, total_price: f64) -> Result<(), RepoError> {
        sqlx::query("UPDATE bookings SET total_price = $1, updated_at = NOW() WHERE id = $2")
            .bind(total_price)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_calendar_ref(&self, id: Uuid, event_ref: &str) -> Result<(), RepoError> {
        sqlx::query("UPDATE bookings SET calendar_event_ref = $1, updated_at = NOW() WHERE id = $2")
            .bind(event_ref)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn stale_approved_unpaid(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings \
             WHERE status = 'approved' AND payment_status = 'unpaid' AND created_at < $1",
            BOOKING_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(booking_from_row).collect()
    }

    async fn due_reminders(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings \
             WHERE status = 'approved' AND payment_status = 'paid' \
               AND reminder_sent = FALSE AND start_time >= $1 AND start_time < $2",
            BOOKING_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(booking_from_row).collect()
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("UPDATE bookings SET reminder_sent = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn booking_counts_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Uuid, i64)>, RepoError> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT room_id, COUNT(*) FROM bookings WHERE user_id = $1 GROUP BY room_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn analytics(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        room_id: Option<Uuid>,
    ) -> Result<AnalyticsSummary, RepoError> {
        let total_revenue: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_price), 0)
            FROM bookings
            WHERE status = 'approved' AND payment_status = 'paid'
              AND start_time >= $1 AND start_time < $2
              AND ($3::uuid IS NULL OR room_id = $3)
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(room_id)
        .fetch_one(&self.pool)
        .await?;

        let booking_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE status = 'approved'
              AND start_time >= $1 AND start_time < $2
              AND ($3::uuid IS NULL OR room_id = $3)
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(room_id)
        .fetch_one(&self.pool)
        .await?;

        let by_room: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT r.name, COUNT(*)
            FROM bookings b
            INNER JOIN rooms r ON r.id = b.room_id
            WHERE b.status = 'approved'
              AND b.start_time >= $1 AND b.start_time < $2
              AND ($3::uuid IS NULL OR b.room_id = $3)
            GROUP BY r.name
            ORDER BY COUNT(*) DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(AnalyticsSummary {
            total_revenue,
            booking_count,
            bookings_by_room: by_room
                .into_iter()
                .map(|(room_name, count)| RoomBookingCount { room_name, count })
                .collect(),
        })
    }

    async fn purge_ended_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM bookings WHERE end_time < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
