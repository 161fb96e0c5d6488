use std::sync::Arc;

use arena_booking::BookingEngine;
use arena_core::notify::Notifier;
use arena_core::repository::{
    AuditRepository, BookingRepository, InvoiceRepository, ReviewRepository, RoomRepository,
    UserRepository,
};
use arena_store::app_config::{BusinessRules, RecommendationConfig};
use arena_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub engine: Arc<BookingEngine>,
    pub notifier: Arc<Notifier>,
    pub redis: Arc<RedisClient>,
    pub auth: AuthConfig,
    pub webhook_secret: String,
    pub rules: BusinessRules,
    pub recommendation: RecommendationConfig,
}
