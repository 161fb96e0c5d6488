use chrono::{DateTime, Utc};

use arena_shared::models::Booking;

/// Half-open interval overlap: `A.start < B.end AND B.start < A.end`.
/// Back-to-back bookings (one ends exactly when the next starts) do
/// not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Existence-only conflict test against already-approved bookings on a
/// room. `exclude` skips the booking being re-approved so recomputation
/// doesn't collide with itself.
pub fn conflicts_with_approved(
    approved: &[Booking],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<uuid::Uuid>,
) -> bool {
    approved
        .iter()
        .filter(|b| Some(b.id) != exclude)
        .any(|b| overlaps(start, end, b.start_time, b.end_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_shared::models::{BookingStatus, PaymentStatus};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 22, h, m, 0).unwrap()
    }

    fn approved(start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            status: BookingStatus::Approved,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            feature_ids: vec![],
            total_price: None,
            calendar_event_ref: None,
            reminder_sent: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn overlapping_intervals_conflict() {
        assert!(overlaps(at(10, 0), at(12, 0), at(9, 0), at(11, 0)));
        assert!(overlaps(at(9, 30), at(10, 30), at(9, 0), at(11, 0)));
        // Containment both ways
        assert!(overlaps(at(9, 0), at(12, 0), at(10, 0), at(11, 0)));
        assert!(overlaps(at(10, 0), at(11, 0), at(9, 0), at(12, 0)));
    }

    #[test]
    fn touching_intervals_do_not_conflict() {
        assert!(!overlaps(at(11, 0), at(13, 0), at(9, 0), at(11, 0)));
        assert!(!overlaps(at(7, 0), at(9, 0), at(9, 0), at(11, 0)));
    }

    #[test]
    fn disjoint_intervals_do_not_conflict() {
        assert!(!overlaps(at(13, 0), at(14, 0), at(9, 0), at(11, 0)));
    }

    #[test]
    fn existence_check_respects_exclusion() {
        let existing = approved(at(9, 0), at(11, 0));
        let id = existing.id;
        let list = vec![existing];

        assert!(conflicts_with_approved(&list, at(10, 0), at(12, 0), None));
        // Re-approving the same booking must not collide with itself.
        assert!(!conflicts_with_approved(&list, at(9, 0), at(11, 0), Some(id)));
        assert!(!conflicts_with_approved(&list, at(11, 0), at(13, 0), None));
    }
}
