use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arena_catalog::quote;
use arena_core::calendar::CalendarClient;
use arena_core::notify::Notifier;
use arena_core::payment::{PaymentError, PaymentHandle};
use arena_core::repository::{
    AuditRepository, BookingRepository, InvoiceRepository, NewBooking, RepoError, RoomRepository,
    UserRepository,
};
use arena_payments::PaymentOrchestrator;
use arena_shared::models::{
    Booking, BookingStatus, Invoice, PaymentMethod, PaymentStatus, Room,
};

use crate::conflict::conflicts_with_approved;
use crate::invoice::render_document;

/// Ceiling for any single third-party call. An elapse counts as that
/// dependency failing; it never rolls back a committed transition.
const EXTERNAL_CALL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidState(String),

    /// Capability gap (refund path undefined for the recorded method).
    #[error("{0}")]
    Unsupported(String),

    /// Third-party failure on the primary path of an operation.
    #[error("{0}")]
    External(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepoError> for BookingError {
    fn from(e: RepoError) -> Self {
        BookingError::Storage(e.to_string())
    }
}

impl From<PaymentError> for BookingError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::Unsupported(msg) => BookingError::Unsupported(msg),
            PaymentError::Provider(msg) => BookingError::External(msg),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub room_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub feature_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalOutcome {
    pub booking_id: Uuid,
    pub total: f64,
    pub payment_handles: Vec<PaymentHandle>,
}

#[derive(Debug, Clone)]
pub struct BookingRules {
    pub currency: String,
    /// Approved-but-unpaid bookings older than this are swept.
    pub cancel_after_hours: i64,
    /// Reminders fire for bookings starting this many hours ahead
    /// (one-hour window).
    pub reminder_lead_hours: i64,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            currency: "EUR".into(),
            cancel_after_hours: 48,
            reminder_lead_hours: 23,
        }
    }
}

/// Drives the booking lifecycle: conflict-checked requests, the
/// approve/reject transitions with their side-effect chain, refunds,
/// webhook reconciliation, and the periodic sweeps. All collaborators
/// are injected so tests can substitute fakes.
pub struct BookingEngine {
    bookings: Arc<dyn BookingRepository>,
    rooms: Arc<dyn RoomRepository>,
    users: Arc<dyn UserRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    audit: Arc<dyn AuditRepository>,
    payments: Arc<PaymentOrchestrator>,
    calendar: Arc<dyn CalendarClient>,
    notifier: Arc<Notifier>,
    rules: BookingRules,
}

impl BookingEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        rooms: Arc<dyn RoomRepository>,
        users: Arc<dyn UserRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        audit: Arc<dyn AuditRepository>,
        payments: Arc<PaymentOrchestrator>,
        calendar: Arc<dyn CalendarClient>,
        notifier: Arc<Notifier>,
        rules: BookingRules,
    ) -> Self {
        Self { bookings, rooms, users, invoices, audit, payments, calendar, notifier, rules }
    }

    /// Citizen requests a slot. Conflict is enforced against approved
    /// bookings only; concurrent pending requests for the same slot are
    /// allowed and resolved at approval time.
    pub async fn request_booking(
        &self,
        citizen_id: Uuid,
        req: BookingRequest,
    ) -> Result<Booking, BookingError> {
        if req.start_time >= req.end_time {
            return Err(BookingError::Validation(
                "start_time must be before end_time".into(),
            ));
        }

        let room = self.find_room(req.room_id).await?;

        let approved = self.bookings.list_approved_for_room(room.id).await?;
        if conflicts_with_approved(&approved, req.start_time, req.end_time, None) {
            return Err(BookingError::Conflict(
                "requested interval overlaps an approved booking".into(),
            ));
        }

        let booking = self
            .bookings
            .insert(NewBooking {
                room_id: room.id,
                user_id: citizen_id,
                start_time: req.start_time,
                end_time: req.end_time,
                feature_ids: req.feature_ids,
            })
            .await?;

        self.record_audit(
            "booking.requested",
            &format!("booking {} requested for room {}", booking.id, room.name),
        )
        .await;
        let office_note_body = format!(
            "Anfrage für {} von {} bis {}.",
            room.name, booking.start_time, booking.end_time
        );
        let office_note = self.notifier.notify_office(
            "Neue Buchungsanfrage",
            &office_note_body,
        );
        if tokio::time::timeout(EXTERNAL_CALL_TIMEOUT, office_note).await.is_err() {
            tracing::error!("office notification for booking {} timed out", booking.id);
        }

        Ok(booking)
    }

    /// Approve: price the booking, commit the transition, then run the
    /// side-effect chain (payment issuance, calendar, invoice,
    /// notification, audit). Each side effect after the commit is
    /// isolated; a failure is logged without rolling back the
    /// transition. Not idempotent: re-approval recomputes the price and
    /// reissues handles, calendar event and invoice.
    pub async fn approve_booking(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> Result<ApprovalOutcome, BookingError> {
        let booking = self.find_booking(booking_id).await?;
        let room = self.find_room(booking.room_id).await?;

        // Overlap is re-checked here so the second of two overlapping
        // pending requests cannot be approved into a double booking.
        let approved = self.bookings.list_approved_for_room(room.id).await?;
        if conflicts_with_approved(
            &approved,
            booking.start_time,
            booking.end_time,
            Some(booking.id),
        ) {
            return Err(BookingError::Conflict(
                "interval overlaps another approved booking on this room".into(),
            ));
        }

        let features = self.bookings_features(&booking).await?;
        let price = quote(&room, booking.start_time, booking.end_time, &features);

        self.bookings.update_status(booking.id, BookingStatus::Approved).await?;
        self.bookings.record_total(booking.id, price.total).await?;

        // Payment issuance is the primary side effect: with no handle
        // at all the approval is surfaced as failed even though the
        // status transition stays committed.
        let handles = tokio::time::timeout(
            EXTERNAL_CALL_TIMEOUT,
            self.payments.issue_handles(
                booking.id,
                price.total,
                &self.rules.currency,
                &format!("{} {} - {}", room.name, booking.start_time, booking.end_time),
            ),
        )
        .await
        .map_err(|_| BookingError::External("payment provider timed out".into()))??;

        let event_summary = format!("Buchung {}", booking.id);
        let event = self.calendar.create_event(
            &room.name,
            booking.start_time,
            booking.end_time,
            &event_summary,
        );
        match tokio::time::timeout(EXTERNAL_CALL_TIMEOUT, event).await {
            Ok(Ok(event_ref)) => {
                if let Err(e) = self.bookings.set_calendar_ref(booking.id, &event_ref).await {
                    tracing::error!("storing calendar ref for {} failed: {}", booking.id, e);
                }
            }
            Ok(Err(e)) => tracing::error!("calendar event for {} failed: {}", booking.id, e),
            Err(_) => tracing::error!("calendar event for {} timed out", booking.id),
        }

        let document = render_document(&booking, &room, &price, &self.rules.currency, &handles);
        let qr_payload = handles
            .iter()
            .find_map(|h| h.qr_payload.clone())
            .unwrap_or_default();
        if let Err(e) = self
            .invoices
            .upsert(Invoice {
                booking_id: booking.id,
                document,
                qr_payload,
                total: price.total,
                generated_at: Utc::now(),
            })
            .await
        {
            tracing::error!("invoice for {} failed: {}", booking.id, e);
        }

        self.notify_citizen(
            &booking,
            "Buchung genehmigt",
            &format!(
                "Ihre Buchung für {} ist genehmigt. Gesamtbetrag: {:.2} {}.",
                room.name, price.total, self.rules.currency
            ),
        )
        .await;

        self.record_audit(
            "booking.approved",
            &format!(
                "booking {} approved by {} (total {:.2} {})",
                booking.id, actor_id, price.total, self.rules.currency
            ),
        )
        .await;

        Ok(ApprovalOutcome {
            booking_id: booking.id,
            total: price.total,
            payment_handles: handles,
        })
    }

    /// Reject is unconditional and terminal.
    pub async fn reject_booking(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> Result<(), BookingError> {
        let booking = self.find_booking(booking_id).await?;

        self.bookings.update_status(booking.id, BookingStatus::Rejected).await?;

        self.notify_citizen(&booking, "Buchung abgelehnt", "Ihre Buchungsanfrage wurde abgelehnt.")
            .await;
        self.record_audit(
            "booking.rejected",
            &format!("booking {} rejected by {}", booking.id, actor_id),
        )
        .await;

        Ok(())
    }

    /// Refund a paid booking through the provider recorded on it. The
    /// total is recomputed exactly as at approval time.
    pub async fn refund_booking(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> Result<(), BookingError> {
        let booking = self.find_booking(booking_id).await?;

        if booking.payment_status != PaymentStatus::Paid {
            return Err(BookingError::InvalidState(
                "only paid bookings can be refunded".into(),
            ));
        }
        let method = booking.payment_method.ok_or_else(|| {
            BookingError::Unsupported("booking has no recorded payment method".into())
        })?;

        let room = self.find_room(booking.room_id).await?;
        let features = self.bookings_features(&booking).await?;
        let price = quote(&room, booking.start_time, booking.end_time, &features);

        let reference = booking.id.simple().to_string();
        tokio::time::timeout(
            EXTERNAL_CALL_TIMEOUT,
            self.payments.refund(method, &reference, price.total),
        )
        .await
        .map_err(|_| BookingError::External("refund call timed out".into()))??;

        self.bookings
            .update_payment(booking.id, PaymentStatus::Refunded, Some(method))
            .await?;

        self.notify_citizen(
            &booking,
            "Erstattung veranlasst",
            &format!("Ihre Zahlung über {:.2} {} wird erstattet.", price.total, self.rules.currency),
        )
        .await;
        self.record_audit(
            "booking.refunded",
            &format!(
                "booking {} refunded by {} ({:.2} {} via {})",
                booking.id,
                actor_id,
                price.total,
                self.rules.currency,
                method.as_str()
            ),
        )
        .await;

        Ok(())
    }

    /// Webhook reconciliation. Unknown bookings and unrecognized event
    /// statuses are logged and ignored so the provider's delivery is
    /// always acknowledged.
    pub async fn reconcile_payment(
        &self,
        booking_id: Uuid,
        method: PaymentMethod,
        event_status: &str,
    ) -> Result<(), BookingError> {
        if event_status != "completed" {
            tracing::info!(%booking_id, event_status, "ignoring payment event");
            return Ok(());
        }

        let Some(booking) = self.bookings.find(booking_id).await? else {
            tracing::warn!(%booking_id, "payment event for unknown booking ignored");
            return Ok(());
        };

        self.bookings
            .update_payment(booking.id, PaymentStatus::Paid, Some(method))
            .await?;

        self.notify_citizen(&booking, "Zahlung eingegangen", "Ihre Zahlung ist eingegangen.")
            .await;
        self.record_audit(
            "payment.completed",
            &format!("booking {} paid via {}", booking.id, method.as_str()),
        )
        .await;

        Ok(())
    }

    /// Daily sweep: cancel approved bookings still unpaid past the
    /// configured age. Returns how many were cancelled.
    pub async fn auto_cancel_stale(&self, now: DateTime<Utc>) -> Result<usize, BookingError> {
        let cutoff = now - Duration::hours(self.rules.cancel_after_hours);
        let stale = self.bookings.stale_approved_unpaid(cutoff).await?;
        let count = stale.len();

        for booking in stale {
            self.bookings.update_status(booking.id, BookingStatus::Cancelled).await?;
            self.notify_citizen(
                &booking,
                "Buchung storniert",
                "Ihre Buchung wurde mangels Zahlung storniert.",
            )
            .await;
            self.record_audit(
                "booking.auto_cancelled",
                &format!("booking {} cancelled after payment timeout", booking.id),
            )
            .await;
        }

        Ok(count)
    }

    /// Hourly sweep: remind citizens of paid bookings starting in the
    /// lead window. The sent-marker keeps overlapping windows from
    /// producing duplicates.
    pub async fn send_reminders(&self, now: DateTime<Utc>) -> Result<usize, BookingError> {
        let from = now + Duration::hours(self.rules.reminder_lead_hours);
        let to = from + Duration::hours(1);
        let due = self.bookings.due_reminders(from, to).await?;
        let count = due.len();

        for booking in due {
            self.notify_citizen(
                &booking,
                "Erinnerung an Ihre Buchung",
                &format!("Ihre Buchung beginnt am {}.", booking.start_time),
            )
            .await;
            self.bookings.mark_reminder_sent(booking.id).await?;
            self.record_audit(
                "booking.reminder",
                &format!("reminder sent for booking {}", booking.id),
            )
            .await;
        }

        Ok(count)
    }

    async fn find_booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.bookings
            .find(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("booking {} not found", id)))
    }

    async fn find_room(&self, id: Uuid) -> Result<Room, BookingError> {
        self.rooms
            .find_room(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("room {} not found", id)))
    }

    async fn bookings_features(
        &self,
        booking: &Booking,
    ) -> Result<Vec<arena_shared::models::Feature>, BookingError> {
        Ok(self.rooms.find_features_by_ids(&booking.feature_ids).await?)
    }

    async fn notify_citizen(&self, booking: &Booking, subject: &str, body: &str) {
        match self.users.find_by_id(booking.user_id).await {
            Ok(Some(user)) => {
                let send = self.notifier.notify_user(&user, subject, body);
                if tokio::time::timeout(EXTERNAL_CALL_TIMEOUT, send).await.is_err() {
                    tracing::error!("notification for booking {} timed out", booking.id);
                }
            }
            Ok(None) => {
                tracing::warn!(user_id = %booking.user_id, "notification skipped, user gone")
            }
            Err(e) => tracing::error!("user lookup for notification failed: {}", e),
        }
    }

    async fn record_audit(&self, entry_type: &str, message: &str) {
        if let Err(e) = self.audit.append(entry_type, message).await {
            tracing::error!("audit append failed: {}", e);
        }
    }
}
