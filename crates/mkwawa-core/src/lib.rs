//! Core types and trait definitions for the KKKT Mkwawa parish registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::ParishStore`]; transports for SMS,
//! elevation and files implement the traits in [`collab`]. The
//! [`parish::Parish`] service ties them together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod asset;
pub mod auth;
pub mod collab;
pub mod error;
pub mod finance;
pub mod humanize;
pub mod ids;
pub mod leader;
pub mod member;
pub mod notification;
pub mod parish;
pub mod report;
pub mod sacrament;
pub mod settings;
pub mod store;
pub mod validate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, ErrorKind, Result};
