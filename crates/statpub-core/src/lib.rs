//! Core types and trait definitions for the statistics publishing store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod content;
pub mod error;
pub mod methodology;
pub mod period;
pub mod release;
pub mod render;
pub mod slug;
pub mod store;
pub mod summary;
pub mod taxonomy;
pub mod view;

pub use error::{Error, ErrorKind, Result, StoreError};
