pub mod bank;
pub mod checkout;
pub mod orchestrator;
pub mod wallet;

pub use bank::{BankTransferConfig, BankTransferProvider};
pub use checkout::CardCheckoutProvider;
pub use orchestrator::PaymentOrchestrator;
pub use wallet::WalletRedirectProvider;
