pub mod pricing;

pub use pricing::{quote, FeatureCharge, Quote};
