use std::collections::VecDeque;

use tokio::sync::RwLock;
use uuid::Uuid;

use agroprice_core::{FeedbackId, FeedbackRecord};

use super::{FeedbackSink, SinkError};

const FEEDBACK_ID_PREFIX: &str = "FB-";
const FEEDBACK_ID_HEX_CHARS: usize = 8;
pub const DEFAULT_FEEDBACK_CAPACITY: usize = 10_000;

/// Keeps the most recent feedback in process memory; records are lost on
/// restart and the oldest record is evicted once capacity is reached.
pub struct InMemoryFeedbackSink {
    capacity: usize,
    records: RwLock<VecDeque<(FeedbackId, FeedbackRecord)>>,
}

impl InMemoryFeedbackSink {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, records: RwLock::new(VecDeque::with_capacity(capacity.min(1_024))) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn records(&self) -> Vec<(FeedbackId, FeedbackRecord)> {
        self.records.read().await.iter().cloned().collect()
    }
}

impl Default for InMemoryFeedbackSink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FEEDBACK_CAPACITY)
    }
}

#[async_trait::async_trait]
impl FeedbackSink for InMemoryFeedbackSink {
    async fn store(&self, record: FeedbackRecord) -> Result<FeedbackId, SinkError> {
        let id = next_feedback_id();
        let mut records = self.records.write().await;
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back((id.clone(), record));
        Ok(id)
    }
}

fn next_feedback_id() -> FeedbackId {
    let hex = Uuid::new_v4().simple().to_string();
    FeedbackId(format!("{FEEDBACK_ID_PREFIX}{}", &hex[..FEEDBACK_ID_HEX_CHARS]))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use agroprice_core::FeedbackRecord;

    use super::DEFAULT_FEEDBACK_CAPACITY;
    use crate::{FeedbackSink, InMemoryFeedbackSink};

    fn record(user: &str) -> FeedbackRecord {
        FeedbackRecord {
            user_id: user.to_string(),
            prediction_id: Some("PRED-1".to_string()),
            actual_price: Some(Decimal::new(1155, 1)),
            accuracy_rating: Some(4),
            usefulness_rating: Some(5),
            comments: None,
            timestamp: "2025-12-05T08:30:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn store_assigns_prefixed_hex_ids() {
        let sink = InMemoryFeedbackSink::default();

        let id = sink.store(record("farmer-1")).await.expect("store feedback");

        assert!(id.0.starts_with("FB-"));
        assert_eq!(id.0.len(), 11);
        assert!(id.0[3..].chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn stored_records_are_retained_in_order() {
        let sink = InMemoryFeedbackSink::default();

        let first = sink.store(record("farmer-1")).await.expect("store first");
        let second = sink.store(record("farmer-2")).await.expect("store second");

        assert_ne!(first, second);
        let records = sink.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, first);
        assert_eq!(records[1].1.user_id, "farmer-2");
    }

    #[tokio::test]
    async fn oldest_record_is_evicted_once_capacity_is_reached() {
        let sink = InMemoryFeedbackSink::with_capacity(2);

        let first = sink.store(record("farmer-1")).await.expect("store first");
        sink.store(record("farmer-2")).await.expect("store second");
        let third = sink.store(record("farmer-3")).await.expect("store third");

        let records = sink.records().await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|(id, _)| *id != first));
        assert_eq!(records[0].1.user_id, "farmer-2");
        assert_eq!(records[1].0, third);
    }

    #[test]
    fn default_sink_is_bounded() {
        assert_eq!(InMemoryFeedbackSink::default().capacity(), DEFAULT_FEEDBACK_CAPACITY);
    }
}
