use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use arena_booking::{BookingEngine, BookingError, BookingRequest, BookingRules};
use arena_core::calendar::LogCalendar;
use arena_core::notify::{Mailer, Notifier, NotifyError, SmsSender};
use arena_core::repository::{
    AuditRepository, BookingRepository, InvoiceRepository, NewBooking, NewUser, RepoError,
    RoomRepository, UserRepository,
};
use arena_payments::{
    BankTransferConfig, BankTransferProvider, CardCheckoutProvider, PaymentOrchestrator,
    WalletRedirectProvider,
};
use arena_shared::models::{
    AnalyticsSummary, AuditEntry, Booking, BookingStatus, Feature, Invoice, PaymentMethod,
    PaymentStatus, PublicBooking, Role, Room, User,
};

// ============================================================================
// In-memory fakes
// ============================================================================

#[derive(Default)]
struct InMemoryBookings {
    rows: Mutex<HashMap<Uuid, Booking>>,
}

impl InMemoryBookings {
    fn get(&self, id: Uuid) -> Option<Booking> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn backdate_creation(&self, id: Uuid, created_at: DateTime<Utc>) {
        let mut rows = self.rows.lock().unwrap();
        rows.get_mut(&id).unwrap().created_at = created_at;
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookings {
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
        self.rows.lock().unwrap().insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        Ok(self.get(id))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Booking>, RepoError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn list_public_approved(&self) -> Result<Vec<PublicBooking>, RepoError> {
        Ok(vec![])
    }

    async fn list_approved_for_room(&self, room_id: Uuid) -> Result<Vec<Booking>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.room_id == room_id && b.status == BookingStatus::Approved)
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or("missing booking")?;
        row.status = status;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn update_payment(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        payment_method: Option<PaymentMethod>,
    ) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or("missing booking")?;
        row.payment_status = payment_status;
        row.payment_method = payment_method;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn record_total(&self, id: Uuid, total_price: f64) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        rows.get_mut(&id).ok_or("missing booking")?.total_price = Some(total_price);
        Ok(())
    }

    async fn set_calendar_ref(&self, id: Uuid, event_ref: &str) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        rows.get_mut(&id).ok_or("missing booking")?.calendar_event_ref =
            Some(event_ref.to_string());
        Ok(())
    }

    async fn stale_approved_unpaid(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|b| {
                b.status == BookingStatus::Approved
                    && b.payment_status == PaymentStatus::Unpaid
                    && b.created_at < cutoff
            })
            .cloned()
            .collect())
    }

    async fn due_reminders(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|b| {
                b.status == BookingStatus::Approved
                    && b.payment_status == PaymentStatus::Paid
                    && !b.reminder_sent
                    && b.start_time >= from
                    && b.start_time < to
            })
            .cloned()
            .collect())
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        rows.get_mut(&id).ok_or("missing booking")?.reminder_sent = true;
        Ok(())
    }

    async fn booking_counts_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Uuid, i64)>, RepoError> {
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for b in self.rows.lock().unwrap().values() {
            if b.user_id == user_id {
                *counts.entry(b.room_id).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    async fn analytics(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
        _room_id: Option<Uuid>,
    ) -> Result<AnalyticsSummary, RepoError> {
        Ok(AnalyticsSummary { total_revenue: 0.0, booking_count: 0, bookings_by_room: vec![] })
    }

    async fn purge_ended_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, b| b.end_time >= cutoff);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
struct InMemoryRooms {
    rooms: Mutex<HashMap<Uuid, Room>>,
    features: Mutex<HashMap<Uuid, Feature>>,
}

#[async_trait]
impl RoomRepository for InMemoryRooms {
    async fn create_room(&self, room: Room) -> Result<(), RepoError> {
        self.rooms.lock().unwrap().insert(room.id, room);
        Ok(())
    }

    async fn find_room(&self, id: Uuid) -> Result<Option<Room>, RepoError> {
        Ok(self.rooms.lock().unwrap().get(&id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RepoError> {
        Ok(self.rooms.lock().unwrap().values().cloned().collect())
    }

    async fn create_feature(&self, feature: Feature) -> Result<(), RepoError> {
        self.features.lock().unwrap().insert(feature.id, feature);
        Ok(())
    }

    async fn list_features(&self, room_id: Uuid) -> Result<Vec<Feature>, RepoError> {
        Ok(self
            .features
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn find_features_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Feature>, RepoError> {
        let features = self.features.lock().unwrap();
        Ok(ids.iter().filter_map(|id| features.get(id).cloned()).collect())
    }
}

#[derive(Default)]
struct InMemoryUsers {
    rows: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create_user(&self, new: NewUser) -> Result<User, RepoError> {
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            phone: new.phone,
            locale: new.locale,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.rows.lock().unwrap().values().find(|u| u.email == email).cloned())
    }

    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(u) => {
                u.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user_data(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
struct InMemoryInvoices {
    rows: Mutex<HashMap<Uuid, Invoice>>,
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoices {
    async fn upsert(&self, invoice: Invoice) -> Result<(), RepoError> {
        self.rows.lock().unwrap().insert(invoice.booking_id, invoice);
        Ok(())
    }

    async fn find(&self, booking_id: Uuid) -> Result<Option<Invoice>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&booking_id).cloned())
    }
}

#[derive(Default)]
struct InMemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAudit {
    fn types(&self) -> Vec<String> {
        self.entries.lock().unwrap().iter().map(|e| e.entry_type.clone()).collect()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAudit {
    async fn append(&self, entry_type: &str, message: &str) -> Result<(), RepoError> {
        self.entries.lock().unwrap().push(AuditEntry {
            id: Uuid::new_v4(),
            entry_type: entry_type.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>, RepoError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.iter().rev().take(limit as usize).cloned().collect())
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSms {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl SmsSender for RecordingSms {
    async fn send(&self, phone: &str, _body: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(phone.to_string());
        Ok(())
    }
}

// ============================================================================
// Fixture
// ============================================================================

struct World {
    engine: BookingEngine,
    bookings: Arc<InMemoryBookings>,
    rooms: Arc<InMemoryRooms>,
    users: Arc<InMemoryUsers>,
    invoices: Arc<InMemoryInvoices>,
    audit: Arc<InMemoryAudit>,
    mailer: Arc<RecordingMailer>,
    sms: Arc<RecordingSms>,
}

fn world() -> World {
    let bookings = Arc::new(InMemoryBookings::default());
    let rooms = Arc::new(InMemoryRooms::default());
    let users = Arc::new(InMemoryUsers::default());
    let invoices = Arc::new(InMemoryInvoices::default());
    let audit = Arc::new(InMemoryAudit::default());
    let mailer = Arc::new(RecordingMailer::default());
    let sms = Arc::new(RecordingSms::default());

    let payments = Arc::new(PaymentOrchestrator::new(vec![
        Arc::new(CardCheckoutProvider::new("https://pay.example/checkout")),
        Arc::new(WalletRedirectProvider::new("https://wallet.example/redirect")),
        Arc::new(BankTransferProvider::new(BankTransferConfig {
            beneficiary: "Stadt Musterstadt Sportamt".into(),
            iban: "DE02120300000000202051".into(),
            bic: "BYLADEM1001".into(),
        })),
    ]));
    let notifier = Arc::new(Notifier::new(
        mailer.clone(),
        sms.clone(),
        "sportamt@stadt.example".into(),
    ));

    let engine = BookingEngine::new(
        bookings.clone(),
        rooms.clone(),
        users.clone(),
        invoices.clone(),
        audit.clone(),
        payments,
        Arc::new(LogCalendar),
        notifier,
        BookingRules::default(),
    );

    World { engine, bookings, rooms, users, invoices, audit, mailer, sms }
}

impl World {
    async fn add_room(&self, name: &str, rate: f64) -> Room {
        let room = Room {
            id: Uuid::new_v4(),
            name: name.into(),
            capacity: 50,
            price_per_hour: rate,
            lat: None,
            lng: None,
            created_at: Utc::now(),
        };
        self.rooms.create_room(room.clone()).await.unwrap();
        room
    }

    async fn add_citizen(&self, phone: Option<&str>) -> User {
        self.users
            .create_user(NewUser {
                username: format!("citizen-{}", Uuid::new_v4().simple()),
                email: format!("{}@example.org", Uuid::new_v4().simple()),
                password_hash: "salt$digest".into(),
                role: Role::Citizen,
                phone: phone.map(str::to_string),
                locale: Some("de".into()),
            })
            .await
            .unwrap()
    }
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 22, h, m, 0).unwrap()
}

fn request(room_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> BookingRequest {
    BookingRequest { room_id, start_time: start, end_time: end, feature_ids: vec![] }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn hall_a_scenario() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    // 09:00-11:00 requested and approved: total = 40.00.
    let first = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();
    assert_eq!(first.status, BookingStatus::Pending);
    assert_eq!(first.payment_status, PaymentStatus::Unpaid);

    let outcome = w.engine.approve_booking(admin, first.id).await.unwrap();
    assert_eq!(outcome.total, 40.0);
    assert_eq!(outcome.payment_handles.len(), 3);
    assert_eq!(w.bookings.get(first.id).unwrap().status, BookingStatus::Approved);

    // 10:00-12:00 overlaps the approved booking.
    let err = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(10, 0), at(12, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Conflict(_)));

    // 11:00-13:00 touches but does not overlap.
    let adjacent = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(11, 0), at(13, 0)))
        .await
        .unwrap();
    assert_eq!(adjacent.status, BookingStatus::Pending);
}

#[tokio::test]
async fn rejects_inverted_interval() {
    let w = world();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let err = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(11, 0), at(9, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));
}

#[tokio::test]
async fn pending_requests_may_overlap_but_second_approval_fails() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle B", 15.0).await;
    let citizen = w.add_citizen(None).await;

    let a = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();
    let b = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(10, 0), at(12, 0)))
        .await
        .unwrap();

    w.engine.approve_booking(admin, a.id).await.unwrap();

    let err = w.engine.approve_booking(admin, b.id).await.unwrap_err();
    assert!(matches!(err, BookingError::Conflict(_)));
    assert_eq!(w.bookings.get(b.id).unwrap().status, BookingStatus::Pending);
}

#[tokio::test]
async fn approval_prices_features_and_drops_vanished_ids() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let beamer = Feature {
        id: Uuid::new_v4(),
        room_id: hall.id,
        name: "Beamer".into(),
        price: 10.0,
    };
    w.rooms.create_feature(beamer.clone()).await.unwrap();
    let vanished = Uuid::new_v4();

    let booking = w
        .engine
        .request_booking(
            citizen.id,
            BookingRequest {
                room_id: hall.id,
                start_time: at(9, 0),
                end_time: at(11, 0),
                feature_ids: vec![beamer.id, vanished],
            },
        )
        .await
        .unwrap();

    let outcome = w.engine.approve_booking(admin, booking.id).await.unwrap();
    // 2h * 20 + 10, the vanished id charges nothing.
    assert_eq!(outcome.total, 50.0);
    assert_eq!(w.bookings.get(booking.id).unwrap().total_price, Some(50.0));

    let invoice = w.invoices.find(booking.id).await.unwrap().unwrap();
    assert_eq!(invoice.total, 50.0);
    assert!(invoice.document.contains("Beamer"));
    assert!(invoice.qr_payload.contains("BCD"));
}

#[tokio::test]
async fn reapproval_regenerates_invoice() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let booking = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();

    w.engine.approve_booking(admin, booking.id).await.unwrap();
    let first = w.invoices.find(booking.id).await.unwrap().unwrap();

    w.engine.approve_booking(admin, booking.id).await.unwrap();
    let second = w.invoices.find(booking.id).await.unwrap().unwrap();

    assert_eq!(first.total, second.total);
    assert!(second.generated_at >= first.generated_at);
}

#[tokio::test]
async fn reject_is_unconditional_and_terminal() {
    let w = world();
    let actor = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let booking = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();
    w.engine.approve_booking(actor, booking.id).await.unwrap();

    // No pending-state guard: rejecting an approved booking sticks.
    w.engine.reject_booking(actor, booking.id).await.unwrap();
    assert_eq!(w.bookings.get(booking.id).unwrap().status, BookingStatus::Rejected);
}

// ============================================================================
// Payment reconciliation and refunds
// ============================================================================

#[tokio::test]
async fn webhook_marks_paid_and_unknown_ids_are_acknowledged() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(Some("+491701234567")).await;

    let booking = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();
    w.engine.approve_booking(admin, booking.id).await.unwrap();

    w.engine
        .reconcile_payment(booking.id, PaymentMethod::Card, "completed")
        .await
        .unwrap();
    let row = w.bookings.get(booking.id).unwrap();
    assert_eq!(row.payment_status, PaymentStatus::Paid);
    assert_eq!(row.payment_method, Some(PaymentMethod::Card));

    // Unknown booking id: logged, ignored, still Ok so the provider
    // gets its acknowledgement.
    w.engine
        .reconcile_payment(Uuid::new_v4(), PaymentMethod::Card, "completed")
        .await
        .unwrap();

    // Unrecognized status leaves the booking untouched.
    w.engine
        .reconcile_payment(booking.id, PaymentMethod::Card, "chargeback")
        .await
        .unwrap();
    assert_eq!(w.bookings.get(booking.id).unwrap().payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn refund_requires_paid_status() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let booking = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();
    w.engine.approve_booking(admin, booking.id).await.unwrap();

    let err = w.engine.refund_booking(admin, booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidState(_)));
    assert_eq!(w.bookings.get(booking.id).unwrap().payment_status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn refund_of_card_payment_transitions_to_refunded() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let booking = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();
    w.engine.approve_booking(admin, booking.id).await.unwrap();
    w.engine
        .reconcile_payment(booking.id, PaymentMethod::Card, "completed")
        .await
        .unwrap();

    w.engine.refund_booking(admin, booking.id).await.unwrap();
    let row = w.bookings.get(booking.id).unwrap();
    assert_eq!(row.payment_status, PaymentStatus::Refunded);
    assert_eq!(row.status, BookingStatus::Approved);
}

#[tokio::test]
async fn refund_of_bank_transfer_is_unsupported() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let booking = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();
    w.engine.approve_booking(admin, booking.id).await.unwrap();
    w.engine
        .reconcile_payment(booking.id, PaymentMethod::BankTransfer, "completed")
        .await
        .unwrap();

    let err = w.engine.refund_booking(admin, booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::Unsupported(_)));
    // Still paid: the failed refund must not move the payment status.
    assert_eq!(w.bookings.get(booking.id).unwrap().payment_status, PaymentStatus::Paid);
}

// ============================================================================
// Sweeps
// ============================================================================

#[tokio::test]
async fn auto_cancel_sweeps_only_past_the_cutoff() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let booking = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();
    w.engine.approve_booking(admin, booking.id).await.unwrap();

    let created = w.bookings.get(booking.id).unwrap().created_at;

    // 47h after creation: nothing to do.
    let cancelled = w.engine.auto_cancel_stale(created + Duration::hours(47)).await.unwrap();
    assert_eq!(cancelled, 0);
    assert_eq!(w.bookings.get(booking.id).unwrap().status, BookingStatus::Approved);

    // 49h after creation: swept.
    let cancelled = w.engine.auto_cancel_stale(created + Duration::hours(49)).await.unwrap();
    assert_eq!(cancelled, 1);
    assert_eq!(w.bookings.get(booking.id).unwrap().status, BookingStatus::Cancelled);
    assert!(w.audit.types().contains(&"booking.auto_cancelled".to_string()));
}

#[tokio::test]
async fn paid_bookings_are_not_auto_cancelled() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let booking = w
        .engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();
    w.engine.approve_booking(admin, booking.id).await.unwrap();
    w.engine
        .reconcile_payment(booking.id, PaymentMethod::Wallet, "completed")
        .await
        .unwrap();
    w.bookings.backdate_creation(booking.id, Utc::now() - Duration::hours(72));

    let cancelled = w.engine.auto_cancel_stale(Utc::now()).await.unwrap();
    assert_eq!(cancelled, 0);
    assert_eq!(w.bookings.get(booking.id).unwrap().status, BookingStatus::Approved);
}

#[tokio::test]
async fn reminders_fire_once_per_booking() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(Some("+491701234567")).await;

    let now = Utc::now();
    let start = now + Duration::hours(23) + Duration::minutes(30);
    let booking = w
        .engine
        .request_booking(
            citizen.id,
            request(hall.id, start, start + Duration::hours(2)),
        )
        .await
        .unwrap();
    w.engine.approve_booking(admin, booking.id).await.unwrap();
    w.engine
        .reconcile_payment(booking.id, PaymentMethod::Card, "completed")
        .await
        .unwrap();

    let mails_before = w.mailer.sent.lock().unwrap().len();
    let sms_before = w.sms.sent.lock().unwrap().len();

    let sent = w.engine.send_reminders(now).await.unwrap();
    assert_eq!(sent, 1);
    assert!(w.bookings.get(booking.id).unwrap().reminder_sent);
    assert_eq!(w.mailer.sent.lock().unwrap().len(), mails_before + 1);
    // Phone registered, so the SMS channel fires as well.
    assert_eq!(w.sms.sent.lock().unwrap().len(), sms_before + 1);

    // The marker keeps an overlapping second run from re-sending.
    let sent = w.engine.send_reminders(now + Duration::minutes(10)).await.unwrap();
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn reminders_skip_unpaid_and_out_of_window_bookings() {
    let w = world();
    let admin = Uuid::new_v4();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let now = Utc::now();

    // Paid, but starting in 30h: outside the window.
    let far = w
        .engine
        .request_booking(
            citizen.id,
            request(hall.id, now + Duration::hours(30), now + Duration::hours(32)),
        )
        .await
        .unwrap();
    w.engine.approve_booking(admin, far.id).await.unwrap();
    w.engine
        .reconcile_payment(far.id, PaymentMethod::Card, "completed")
        .await
        .unwrap();

    // In the window, but unpaid.
    let unpaid = w
        .engine
        .request_booking(
            citizen.id,
            request(
                hall.id,
                now + Duration::hours(23) + Duration::minutes(30),
                now + Duration::hours(25),
            ),
        )
        .await
        .unwrap();
    w.engine.approve_booking(admin, unpaid.id).await.unwrap();

    let sent = w.engine.send_reminders(now).await.unwrap();
    assert_eq!(sent, 0);
}

// ============================================================================
// Erasure and retention
// ============================================================================

#[tokio::test]
async fn erasure_removes_user_and_their_bookings() {
    let w = world();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    w.engine
        .request_booking(citizen.id, request(hall.id, at(9, 0), at(11, 0)))
        .await
        .unwrap();

    // The store-backed cascade removes both; the fakes model the same
    // contract at the repository seam.
    assert!(w.users.delete_user_data(citizen.id).await.unwrap());
    for b in w.bookings.list_for_user(citizen.id).await.unwrap() {
        w.bookings.rows.lock().unwrap().remove(&b.id);
    }

    assert!(w.users.find_by_id(citizen.id).await.unwrap().is_none());
    assert!(w.bookings.list_for_user(citizen.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn purge_drops_bookings_ended_over_a_year_ago() {
    let w = world();
    let hall = w.add_room("Sporthalle A", 20.0).await;
    let citizen = w.add_citizen(None).await;

    let old_start = Utc::now() - Duration::days(400);
    let booking = w
        .engine
        .request_booking(citizen.id, request(hall.id, old_start, old_start + Duration::hours(2)))
        .await
        .unwrap();

    let purged = w
        .bookings
        .purge_ended_before(Utc::now() - Duration::days(365))
        .await
        .unwrap();
    assert_eq!(purged, 1);
    assert!(w.bookings.get(booking.id).is_none());
}
