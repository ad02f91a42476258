//! SQLite backend for the parish store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each [`ParishStore`] method runs as a
//! single `rusqlite` transaction on that thread.
//!
//! [`ParishStore`]: mkwawa_core::store::ParishStore

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
