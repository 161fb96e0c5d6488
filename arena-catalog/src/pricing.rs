use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arena_shared::models::{Feature, Room};

/// Price breakdown for one booking at approval time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Billed duration in fractional hours, unrounded.
    pub hours: f64,
    pub base: f64,
    pub features: Vec<FeatureCharge>,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCharge {
    pub feature_id: Uuid,
    pub name: String,
    pub price: f64,
}

/// total = hours * room rate + the flat price of every resolved
/// feature. Callers resolve the selected feature ids against the
/// catalog first; ids that no longer exist simply don't appear here.
pub fn quote(
    room: &Room,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    features: &[Feature],
) -> Quote {
    let hours = (end - start).num_seconds() as f64 / 3600.0;
    let base = hours * room.price_per_hour;

    let charges: Vec<FeatureCharge> = features
        .iter()
        .map(|f| FeatureCharge {
            feature_id: f.id,
            name: f.name.clone(),
            price: f.price,
        })
        .collect();

    let total = base + charges.iter().map(|c| c.price).sum::<f64>();

    Quote { hours, base, features: charges, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn room(rate: f64) -> Room {
        Room {
            id: Uuid::new_v4(),
            name: "Sporthalle A".into(),
            capacity: 50,
            price_per_hour: rate,
            lat: None,
            lng: None,
            created_at: Utc::now(),
        }
    }

    fn feature(room_id: Uuid, name: &str, price: f64) -> Feature {
        Feature { id: Uuid::new_v4(), room_id, name: name.into(), price }
    }

    #[test]
    fn two_hours_at_twenty_is_forty() {
        let r = room(20.0);
        let start = Utc.with_ymd_and_hms(2025, 8, 22, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 22, 11, 0, 0).unwrap();
        let q = quote(&r, start, end, &[]);
        assert_eq!(q.hours, 2.0);
        assert_eq!(q.total, 40.0);
    }

    #[test]
    fn fractional_hours_are_billed_unrounded() {
        let r = room(20.0);
        let start = Utc.with_ymd_and_hms(2025, 8, 22, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 22, 10, 30, 0).unwrap();
        let q = quote(&r, start, end, &[]);
        assert_eq!(q.hours, 1.5);
        assert_eq!(q.total, 30.0);
    }

    #[test]
    fn feature_prices_are_flat_additions() {
        let r = room(20.0);
        let start = Utc.with_ymd_and_hms(2025, 8, 22, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 22, 11, 0, 0).unwrap();
        let beamer = feature(r.id, "Beamer", 10.0);
        let whiteboard = feature(r.id, "Whiteboard", 5.0);
        let q = quote(&r, start, end, &[beamer, whiteboard]);
        assert_eq!(q.base, 40.0);
        assert_eq!(q.total, 55.0);
        assert_eq!(q.features.len(), 2);
    }

    #[test]
    fn unresolved_features_do_not_charge() {
        // A vanished feature id never reaches quote(); the resolved
        // slice is simply shorter.
        let r = room(20.0);
        let start = Utc.with_ymd_and_hms(2025, 8, 22, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 22, 11, 0, 0).unwrap();
        let only_surviving = feature(r.id, "Beamer", 10.0);
        let q = quote(&r, start, end, &[only_surviving]);
        assert_eq!(q.total, 50.0);
    }
}
