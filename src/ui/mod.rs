//! Terminal user interface
//!
//! The table view controller and the terminal capabilities it draws on.

pub mod keys;
pub mod scroll_utils;
pub mod surface;
pub mod table_view;
pub mod terminal;
pub mod text_utils;

pub use keys::{CrosstermKeys, Key, KeySource, ScriptedKeys};
pub use surface::{Dimensions, MemorySurface, Surface};
pub use table_view::{Step, TableView, ViewOptions};
pub use terminal::TerminalSurface;
