//! Core types, store abstractions, and services for locallink.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! document store and object storage are traits handed to each service at
//! construction, so any backend (including [`memory::MemoryStore`]) can be
//! substituted.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod activity;
pub mod activity_log;
pub mod board;
pub mod error;
pub mod executor;
pub mod feed;
pub mod ledger;
pub mod memory;
pub mod object;
pub mod profile;
pub mod publish;
pub mod records;
pub mod store;
pub mod upload;
pub mod view;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
