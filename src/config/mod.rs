//! Configuration module
//!
//! Display, search and theme settings loaded from `config.toml`.

pub mod config;

pub use config::Config;
