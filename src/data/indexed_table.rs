use crate::data::record::Record;
use crate::data::record_source::RecordSource;
use crate::data::table::Table;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace};

/// Default cap on the number of columns shown
pub const DEFAULT_MAX_COLUMNS: usize = 5;

/// Random-access cache in front of a sequential [`RecordSource`].
///
/// The cache only ever grows: index `i` is pulled from the source at most
/// once, and the record handed out for it never changes afterwards. Once the
/// source reports exhaustion it is not polled again.
pub struct IndexedTable {
    source: Box<dyn RecordSource>,
    cache: Vec<Record>,
    exhausted: bool,
    max_columns: usize,
}

impl IndexedTable {
    pub fn new<S: RecordSource + 'static>(source: S) -> Self {
        Self::with_max_columns(source, DEFAULT_MAX_COLUMNS)
    }

    pub fn with_max_columns<S: RecordSource + 'static>(source: S, max_columns: usize) -> Self {
        Self {
            source: Box::new(source),
            cache: Vec::new(),
            exhausted: false,
            max_columns,
        }
    }

    /// Number of records materialized so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Largest populated index, `None` while the cache is empty
    pub fn high_water_mark(&self) -> Option<usize> {
        self.cache.len().checked_sub(1)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[async_trait]
impl Table for IndexedTable {
    async fn get(&mut self, index: usize) -> Option<Record> {
        while self.cache.len() <= index {
            if self.exhausted {
                return None;
            }

            match self.source.next_record().await {
                Some(record) => {
                    self.cache.push(record);
                    trace!(target: "table", "Cached record {}", self.cache.len() - 1);
                }
                None => {
                    // the failed pull leaves the high-water mark where it was
                    self.exhausted = true;
                    debug!(target: "table", "Source exhausted after {} records", self.cache.len());
                    return None;
                }
            }
        }

        Some(Arc::clone(&self.cache[index]))
    }

    fn max_columns(&self) -> usize {
        self.max_columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::record_from_value;
    use crate::data::record_source::IterSource;
    use serde_json::json;

    fn numbers(count: usize) -> IndexedTable {
        let records = (0..count).map(|i| record_from_value(json!({"n": i, "label": format!("row {i}")})));
        IndexedTable::new(IterSource::new(records.collect::<Vec<_>>()))
    }

    #[tokio::test]
    async fn test_get_materializes_up_to_index() {
        let mut table = numbers(10);
        assert_eq!(table.high_water_mark(), None);

        let record = table.get(3).await.unwrap();
        assert_eq!(record["n"], json!(3));
        assert_eq!(table.cached_len(), 4);
        assert_eq!(table.high_water_mark(), Some(3));

        // a cached index does not grow the cache
        table.get(1).await.unwrap();
        assert_eq!(table.cached_len(), 4);
    }

    #[tokio::test]
    async fn test_past_end_returns_none_without_moving_mark() {
        let mut table = numbers(3);
        assert!(table.get(7).await.is_none());
        assert!(table.is_exhausted());
        assert_eq!(table.high_water_mark(), Some(2));
        assert_eq!(table.get(2).await.unwrap()["n"], json!(2));
    }

    #[tokio::test]
    async fn test_row_and_schema() {
        let mut table = numbers(2);
        assert_eq!(table.row(1).await.unwrap(), vec![json!(1), json!("row 1")]);
        assert_eq!(table.column_count().await, 2);
        assert_eq!(table.column_name(0).await.as_deref(), Some("n"));
        assert_eq!(table.column_name(1).await.as_deref(), Some("label"));
        assert_eq!(table.column_name(2).await, None);
    }

    #[tokio::test]
    async fn test_column_count_is_capped() {
        let wide = record_from_value(json!({"a": 1, "b": 2, "c": 3, "d": 4}));
        let mut table = IndexedTable::with_max_columns(IterSource::new(vec![wide]), 3);
        assert_eq!(table.column_count().await, 3);
    }

    #[tokio::test]
    async fn test_empty_source_has_no_columns() {
        let mut table = numbers(0);
        assert_eq!(table.column_count().await, 0);
        assert_eq!(table.column_name(0).await, None);
        assert!(table.row(0).await.is_none());
    }
}
