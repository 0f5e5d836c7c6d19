//! SQLite schema, migrations and the [`Database`] store.

mod db;
pub mod migrations;

pub use db::Database;
