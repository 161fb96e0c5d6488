use arena_catalog::Quote;
use arena_core::payment::PaymentHandle;
use arena_shared::models::{Booking, Room};

/// Renders the invoice artifact for an approved booking: room, time
/// range, feature breakdown, total, and payment instructions with the
/// embedded bank-transfer payload. Plain text, addressed by booking id,
/// overwritten on re-approval.
pub fn render_document(
    booking: &Booking,
    room: &Room,
    quote: &Quote,
    currency: &str,
    handles: &[PaymentHandle],
) -> String {
    let mut doc = String::new();

    doc.push_str("RECHNUNG / INVOICE\n");
    doc.push_str("==================\n\n");
    doc.push_str(&format!("Booking:  {}\n", booking.id));
    doc.push_str(&format!("Room:     {}\n", room.name));
    doc.push_str(&format!(
        "Period:   {} - {}\n\n",
        booking.start_time.format("%Y-%m-%d %H:%M"),
        booking.end_time.format("%Y-%m-%d %H:%M")
    ));

    doc.push_str(&format!(
        "Room hire: {:.2} h x {:.2} {} = {:.2} {}\n",
        quote.hours, room.price_per_hour, currency, quote.base, currency
    ));
    for charge in &quote.features {
        doc.push_str(&format!("{}: {:.2} {}\n", charge.name, charge.price, currency));
    }
    doc.push_str(&format!("\nTOTAL: {:.2} {}\n\n", quote.total, currency));

    doc.push_str("Payment options\n");
    doc.push_str("---------------\n");
    for handle in handles {
        match (&handle.redirect_url, &handle.qr_payload) {
            (Some(url), _) => {
                doc.push_str(&format!("{}: {}\n", handle.method.as_str(), url));
            }
            (None, Some(payload)) => {
                doc.push_str(&format!(
                    "{} (scan to pay, reference {}):\n{}\n",
                    handle.method.as_str(),
                    handle.reference,
                    payload
                ));
            }
            (None, None) => {
                doc.push_str(&format!(
                    "{}: reference {}\n",
                    handle.method.as_str(),
                    handle.reference
                ));
            }
        }
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_catalog::quote;
    use arena_shared::models::{BookingStatus, PaymentMethod, PaymentStatus, Room};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn document_carries_breakdown_total_and_qr() {
        let room = Room {
            id: Uuid::new_v4(),
            name: "Sporthalle A".into(),
            capacity: 50,
            price_per_hour: 20.0,
            lat: None,
            lng: None,
            created_at: Utc::now(),
        };
        let start = Utc.with_ymd_and_hms(2025, 8, 22, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 22, 11, 0, 0).unwrap();
        let booking = Booking {
            id: Uuid::new_v4(),
            room_id: room.id,
            user_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            status: BookingStatus::Approved,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            feature_ids: vec![],
            total_price: Some(40.0),
            calendar_event_ref: None,
            reminder_sent: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let q = quote(&room, start, end, &[]);
        let handle = PaymentHandle {
            method: PaymentMethod::BankTransfer,
            reference: "sepa_x".into(),
            amount: 40.0,
            currency: "EUR".into(),
            redirect_url: None,
            qr_payload: Some("BCD\n002\n1\nSCT".into()),
            created_at: Utc::now(),
        };

        let doc = render_document(&booking, &room, &q, "EUR", &[handle]);
        assert!(doc.contains("Sporthalle A"));
        assert!(doc.contains("TOTAL: 40.00 EUR"));
        assert!(doc.contains("BCD"));
        assert!(doc.contains("sepa_x"));
    }
}
