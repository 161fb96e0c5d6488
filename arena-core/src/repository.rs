use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use arena_shared::models::{
    AnalyticsSummary, AuditEntry, Booking, BookingStatus, Feature, Invoice, PaymentMethod,
    PaymentStatus, PublicBooking, Review, ReviewWithAuthor, Role, Room, User,
};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// New-booking insert payload. The id, status (`pending`) and payment
/// status (`unpaid`) are assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub feature_ids: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub locale: Option<String>,
}

/// Repository trait for user data access
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, RepoError>;

    async fn list_users(&self) -> Result<Vec<User>, RepoError>;

    async fn update_role(&self, id: Uuid, role: Role) -> Result<bool, RepoError>;

    /// Right-to-erasure cascade: reviews, bookings, then the user row,
    /// in one transaction. Returns false when the user did not exist.
    async fn delete_user_data(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// Repository trait for room and feature catalog access
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create_room(&self, room: Room) -> Result<(), RepoError>;

    async fn find_room(&self, id: Uuid) -> Result<Option<Room>, RepoError>;

    async fn list_rooms(&self) -> Result<Vec<Room>, RepoError>;

    async fn create_feature(&self, feature: Feature) -> Result<(), RepoError>;

    async fn list_features(&self, room_id: Uuid) -> Result<Vec<Feature>, RepoError>;

    /// Resolves the given feature ids against the catalog. Ids that no
    /// longer exist are simply absent from the result.
    async fn find_features_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Feature>, RepoError>;
}

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: NewBooking) -> Result<Booking, RepoError>;

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, RepoError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Booking>, RepoError>;

    async fn list_public_approved(&self) -> Result<Vec<PublicBooking>, RepoError>;

    async fn list_approved_for_room(&self, room_id: Uuid) -> Result<Vec<Booking>, RepoError>;

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<(), RepoError>;

    async fn update_payment(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        payment_method: Option<PaymentMethod>,
    ) -> Result<(), RepoError>;

    async fn record_total(&self, id: Uuid, total_price: f64) -> Result<(), RepoError>;

    async fn set_calendar_ref(&self, id: Uuid, event_ref: &str) -> Result<(), RepoError>;

    /// Approved, unpaid bookings created before the cutoff (auto-cancel
    /// sweep input).
    async fn stale_approved_unpaid(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError>;

    /// Approved, paid bookings starting inside `[from, to)` that have
    /// not been reminded yet.
    async fn due_reminders(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError>;

    async fn mark_reminder_sent(&self, id: Uuid) -> Result<(), RepoError>;

    /// Booking frequency per room for one user, for recommendation
    /// ranking.
    async fn booking_counts_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Uuid, i64)>, RepoError>;

    async fn analytics(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        room_id: Option<Uuid>,
    ) -> Result<AnalyticsSummary, RepoError>;

    /// Startup housekeeping: drop bookings whose end_time predates the
    /// cutoff. Returns the number of rows removed.
    async fn purge_ended_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepoError>;
}

/// Repository trait for review data access
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert(&self, review: Review) -> Result<(), RepoError>;

    async fn list_for_room(&self, room_id: Uuid) -> Result<Vec<ReviewWithAuthor>, RepoError>;

    async fn average_rating(&self, room_id: Uuid) -> Result<Option<f64>, RepoError>;

    /// Average rating per room across the whole catalog.
    async fn rating_averages(&self) -> Result<Vec<(Uuid, f64)>, RepoError>;
}

/// Append-only audit log access
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry_type: &str, message: &str) -> Result<(), RepoError>;

    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>, RepoError>;
}

/// Invoice artifact storage, one row per booking, overwritten on
/// re-approval
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn upsert(&self, invoice: Invoice) -> Result<(), RepoError>;

    async fn find(&self, booking_id: Uuid) -> Result<Option<Invoice>, RepoError>;
}
