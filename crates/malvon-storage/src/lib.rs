//! Malvon Storage Layer
//!
//! Thin SQLite wrapper shared by every durable store in the browser.
//! Each store owns its own database file and its own migration list;
//! all multi-row writes go through [`Database::transaction`].

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;
pub use migrations::Migration;

pub type Result<T> = std::result::Result<T, StorageError>;
