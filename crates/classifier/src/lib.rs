//! Performance classification and alert synthesis for campaigns, ad sets
//! and ads. Everything in this crate is a pure function of its inputs.

pub mod alerts;
pub mod classifier;
pub mod metrics;

pub use alerts::synthesize;
pub use classifier::{classify, classify_all, ClassifiedEntity};
pub use metrics::DerivedMetrics;
