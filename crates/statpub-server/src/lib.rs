//! Server-side wiring for the statistics publishing API: configuration,
//! table-building service clients and fixture seeding.
//!
//! The `statpub-server` binary in `main.rs` ties these together.

pub mod config;
pub mod seed;
pub mod tables;

pub use config::ServerConfig;
