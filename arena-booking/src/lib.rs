pub mod conflict;
pub mod engine;
pub mod invoice;

pub use engine::{ApprovalOutcome, BookingEngine, BookingError, BookingRequest, BookingRules};
