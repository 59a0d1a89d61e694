use crate::data::record::Record;
use crate::data::table::Table;
use crate::search_filter::Predicate;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace};

/// Dense, order-preserving view of the upstream records that satisfy a
/// predicate.
///
/// Matches are re-indexed from zero. Scanning is incremental: asking for a
/// later index resumes from the upstream cursor, so every upstream record
/// is tested at most once for the lifetime of the filter.
pub struct FilterTable<U> {
    upstream: U,
    predicate: Box<dyn Predicate>,
    cache: Vec<Record>,
    upstream_cursor: usize,
}

impl<U: Table> FilterTable<U> {
    pub fn new<P: Predicate + 'static>(upstream: U, predicate: P) -> Self {
        Self {
            upstream,
            predicate: Box::new(predicate),
            cache: Vec::new(),
            upstream_cursor: 0,
        }
    }

    /// Number of matches found so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Next upstream index that has not been tested yet
    pub fn upstream_cursor(&self) -> usize {
        self.upstream_cursor
    }
}

#[async_trait]
impl<U: Table> Table for FilterTable<U> {
    async fn get(&mut self, index: usize) -> Option<Record> {
        while self.cache.len() <= index {
            let record = match self.upstream.get(self.upstream_cursor).await {
                Some(record) => record,
                None => {
                    debug!(
                        target: "filter",
                        "Upstream exhausted at {} with {} matches",
                        self.upstream_cursor,
                        self.cache.len()
                    );
                    return None;
                }
            };
            // only advance once the verdict is in, a dropped get retests this record
            let matched = self.predicate.matches(&record).await;
            self.upstream_cursor += 1;

            if matched {
                trace!(target: "filter", "Upstream {} -> match {}", self.upstream_cursor - 1, self.cache.len());
                self.cache.push(record);
            }
        }

        Some(Arc::clone(&self.cache[index]))
    }

    fn max_columns(&self) -> usize {
        self.upstream.max_columns()
    }
}
