use crate::data::record::{row_of, Record, Row};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Random access over a lazily materialized sequence of records.
///
/// `get` returns `None` once the index is past the end of the data; that is
/// the normal "no more rows" signal, not an error. Everything else is derived
/// from `get`, so both the base table and filters share the same view of
/// rows and schema.
#[async_trait]
pub trait Table: Send {
    async fn get(&mut self, index: usize) -> Option<Record>;

    /// Cap applied to the number of columns derived from record 0
    fn max_columns(&self) -> usize;

    async fn row(&mut self, index: usize) -> Option<Row> {
        self.get(index).await.map(|record| row_of(&record))
    }

    async fn column_count(&mut self) -> usize {
        let max_columns = self.max_columns();
        match self.row(0).await {
            Some(row) => row.len().min(max_columns),
            None => 0,
        }
    }

    async fn column_name(&mut self, index: usize) -> Option<String> {
        let first = self.get(0).await?;
        first.keys().nth(index).cloned()
    }
}

/// Shared, type-erased table.
///
/// The view swaps between the base table and filters through handles, and a
/// filter holds a handle to the base so both see the same growing cache.
/// Cloning a handle clones the pointer, never the table.
#[derive(Clone)]
pub struct TableHandle {
    inner: Arc<Mutex<dyn Table>>,
    max_columns: usize,
}

impl TableHandle {
    pub fn new<T: Table + 'static>(table: T) -> Self {
        let max_columns = table.max_columns();
        Self {
            inner: Arc::new(Mutex::new(table)),
            max_columns,
        }
    }

    /// True when both handles point at the very same table
    pub fn same_table(&self, other: &TableHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for TableHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableHandle")
            .field("table", &Arc::as_ptr(&self.inner).cast::<()>())
            .field("max_columns", &self.max_columns)
            .finish()
    }
}

#[async_trait]
impl Table for TableHandle {
    async fn get(&mut self, index: usize) -> Option<Record> {
        let mut table = self.inner.lock().await;
        table.get(index).await
    }

    fn max_columns(&self) -> usize {
        self.max_columns
    }
}
