use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[error("calendar service failure: {0}")]
pub struct CalendarError(pub String);

#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// Create an event for the booked interval and return the external
    /// event reference.
    async fn create_event(
        &self,
        room_name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: &str,
    ) -> Result<String, CalendarError>;
}

/// Local stand-in that mints an event reference and logs. The hosted
/// calendar integration is deployment wiring.
pub struct LogCalendar;

#[async_trait]
impl CalendarClient for LogCalendar {
    async fn create_event(
        &self,
        room_name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: &str,
    ) -> Result<String, CalendarError> {
        let event_ref = format!("evt_{}", Uuid::new_v4().simple());
        tracing::info!(room_name, %start, %end, summary, %event_ref, "calendar event created");
        Ok(event_ref)
    }
}
