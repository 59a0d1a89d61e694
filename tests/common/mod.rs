#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tabview::data::record::record_from_value;
use tabview::data::{Record, RecordSource};

/// Source that counts how often it is polled and can be made slow
pub struct CountingSource {
    records: VecDeque<Record>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl CountingSource {
    pub fn new(records: Vec<Record>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            records: records.into(),
            calls: Arc::clone(&calls),
            delay: None,
        };
        (source, calls)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl RecordSource for CountingSource {
    async fn next_record(&mut self) -> Option<Record> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.records.pop_front()
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// `{"id": i, "name": "item-i"}` for `0..count`
pub fn numbered_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| record_from_value(json!({"id": i, "name": format!("item-{i}")})))
        .collect()
}
