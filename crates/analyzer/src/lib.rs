//! Analysis passes over a snapshot source.

pub mod pipeline;
pub mod summary;

pub use pipeline::{AlertPipeline, AnalysisOptions, AnalysisReport};
pub use summary::AlertSummary;
