//! Storage layer for songs and their lyrics.
//!
//! This crate defines the song/verse data model, the [`Storage`] capability
//! trait, its SQLite implementation ([`schema::Database`]) and the query
//! builder used for sparse updates.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod query;
pub mod schema;
pub mod storage;

pub use error::{Error, Result};
pub use schema::Database;
pub use storage::Storage;
