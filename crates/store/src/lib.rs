use async_trait::async_trait;
use thiserror::Error;

use agroprice_core::{FeedbackId, FeedbackRecord, ImpactStats};

pub mod memory;
pub mod stats;

pub use memory::InMemoryFeedbackSink;
pub use stats::StaticImpactStats;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("feedback sink unavailable: {0}")]
    Unavailable(String),
    #[error("statistics source unavailable: {0}")]
    StatsUnavailable(String),
}

/// Destination for validated user feedback.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn store(&self, record: FeedbackRecord) -> Result<FeedbackId, SinkError>;
}

/// Source of the aggregate figures behind `/impact-stats`.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn snapshot(&self) -> Result<ImpactStats, SinkError>;
}
