pub mod app_config;
pub mod audit_repo;
pub mod booking_repo;
pub mod database;
pub mod invoice_repo;
pub mod redis_repo;
pub mod review_repo;
pub mod room_repo;
pub mod user_repo;

pub use audit_repo::StoreAuditRepository;
pub use booking_repo::StoreBookingRepository;
pub use database::DbClient;
pub use invoice_repo::StoreInvoiceRepository;
pub use redis_repo::RedisClient;
pub use review_repo::StoreReviewRepository;
pub use room_repo::StoreRoomRepository;
pub use user_repo::StoreUserRepository;
