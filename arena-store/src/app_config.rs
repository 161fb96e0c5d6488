use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub webhook: WebhookConfig,
    pub contact: ContactConfig,
    pub business_rules: BusinessRules,
    pub payments: PaymentEndpoints,
    pub bank_transfer: BankAccountConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContactConfig {
    pub office_email: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    pub currency: String,
    pub cancel_after_hours: i64,
    pub reminder_lead_hours: i64,
    pub retention_days: i64,
    pub comment_max_chars: usize,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: i64,
}

fn default_rate_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentEndpoints {
    pub checkout_base_url: String,
    pub wallet_base_url: String,
}

/// Beneficiary account embedded into bank-transfer QR payloads.
#[derive(Debug, Deserialize, Clone)]
pub struct BankAccountConfig {
    pub beneficiary: String,
    pub iban: String,
    pub bic: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationConfig {
    pub frequency_weight: f64,
    pub rating_weight: f64,
    pub max_results: usize,
    pub cache_ttl_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Environment-specific overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Env overrides, e.g. ARENA__SERVER__PORT=9000
            .add_source(config::Environment::with_prefix("ARENA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
