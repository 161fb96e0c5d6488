use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};
use tracing::{error, info};

use arena_booking::BookingEngine;

/// Spawns the two fixed-cadence sweeps on independent timers. Single
/// active instance is assumed; there is no distributed lock.
pub fn spawn_jobs(engine: Arc<BookingEngine>) {
    let cancel_engine = engine.clone();
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(24 * 60 * 60));
        loop {
            ticker.tick().await;
            match cancel_engine.auto_cancel_stale(Utc::now()).await {
                Ok(0) => {}
                Ok(n) => info!("auto-cancel sweep cancelled {} stale bookings", n),
                Err(e) => error!("auto-cancel sweep failed: {}", e),
            }
        }
    });

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(60 * 60));
        loop {
            ticker.tick().await;
            match engine.send_reminders(Utc::now()).await {
                Ok(0) => {}
                Ok(n) => info!("reminder sweep sent {} reminders", n),
                Err(e) => error!("reminder sweep failed: {}", e),
            }
        }
    });

    info!("Scheduled jobs started (auto-cancel daily, reminders hourly)");
}
