use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arena_api::{app, jobs, state::AuthConfig, AppState};
use arena_booking::{BookingEngine, BookingRules};
use arena_core::calendar::LogCalendar;
use arena_core::notify::{LogMailer, LogSms, Notifier};
use arena_core::repository::BookingRepository;
use arena_payments::{
    BankTransferConfig, BankTransferProvider, CardCheckoutProvider, PaymentOrchestrator,
    WalletRedirectProvider,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arena_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = arena_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Arena API on port {}", config.server.port);

    // Postgres
    let db = arena_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis
    let redis = Arc::new(
        arena_store::RedisClient::new(&config.redis.url)
            .await
            .expect("Failed to connect to Redis"),
    );

    // Repositories
    let users: Arc<dyn arena_core::repository::UserRepository> =
        Arc::new(arena_store::StoreUserRepository::new(db.pool.clone()));
    let rooms: Arc<dyn arena_core::repository::RoomRepository> =
        Arc::new(arena_store::StoreRoomRepository::new(db.pool.clone()));
    let bookings: Arc<dyn BookingRepository> =
        Arc::new(arena_store::StoreBookingRepository::new(db.pool.clone()));
    let reviews: Arc<dyn arena_core::repository::ReviewRepository> =
        Arc::new(arena_store::StoreReviewRepository::new(db.pool.clone()));
    let audit: Arc<dyn arena_core::repository::AuditRepository> =
        Arc::new(arena_store::StoreAuditRepository::new(db.pool.clone()));
    let invoices: Arc<dyn arena_core::repository::InvoiceRepository> =
        Arc::new(arena_store::StoreInvoiceRepository::new(db.pool.clone()));

    // Startup housekeeping: best-effort retention purge.
    let retention_cutoff = Utc::now() - Duration::days(config.business_rules.retention_days);
    match bookings.purge_ended_before(retention_cutoff).await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Purged {} bookings past retention", n),
        Err(e) => tracing::warn!("Retention purge failed: {}", e),
    }

    // Payment providers
    let payments = Arc::new(PaymentOrchestrator::new(vec![
        Arc::new(CardCheckoutProvider::new(config.payments.checkout_base_url.clone())),
        Arc::new(WalletRedirectProvider::new(config.payments.wallet_base_url.clone())),
        Arc::new(BankTransferProvider::new(BankTransferConfig {
            beneficiary: config.bank_transfer.beneficiary.clone(),
            iban: config.bank_transfer.iban.clone(),
            bic: config.bank_transfer.bic.clone(),
        })),
    ]));

    // Notification and calendar transports (logging stand-ins; the
    // hosted services are wired per deployment)
    let notifier = Arc::new(Notifier::new(
        Arc::new(LogMailer),
        Arc::new(LogSms),
        config.contact.office_email.clone(),
    ));

    let engine = Arc::new(BookingEngine::new(
        bookings.clone(),
        rooms.clone(),
        users.clone(),
        invoices.clone(),
        audit.clone(),
        payments,
        Arc::new(LogCalendar),
        notifier.clone(),
        BookingRules {
            currency: config.business_rules.currency.clone(),
            cancel_after_hours: config.business_rules.cancel_after_hours,
            reminder_lead_hours: config.business_rules.reminder_lead_hours,
        },
    ));

    jobs::spawn_jobs(engine.clone());

    let app_state = AppState {
        users,
        rooms,
        bookings,
        reviews,
        audit,
        invoices,
        engine,
        notifier,
        redis,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        webhook_secret: config.webhook.secret.clone(),
        rules: config.business_rules.clone(),
        recommendation: config.recommendation.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("Server error");
}
