//! Interactive terminal table browser.
//!
//! Records from any asynchronous source are cached behind an indexed table,
//! narrowed by search-as-you-type filters, and shown in a scrollable,
//! column-aligned view.

pub mod config;
pub mod data;
pub mod search_filter;
pub mod ui;
pub mod utils;
