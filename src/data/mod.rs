//! Data pipeline
//!
//! Record sources feed an indexed cache, which filters decorate. Loaders
//! build sources from JSON, JSON Lines and CSV input.

pub mod filter_table;
pub mod indexed_table;
pub mod loaders;
pub mod record;
pub mod record_source;
pub mod table;

pub use filter_table::FilterTable;
pub use indexed_table::IndexedTable;
pub use record::{Record, Row};
pub use record_source::RecordSource;
pub use table::{Table, TableHandle};
