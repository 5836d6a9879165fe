//! Core types and trait definitions for the Purveyor supplier directory.
//!
//! This crate is deliberately free of database dependencies. It owns the
//! domain model (suppliers and their detail collections), the session/role
//! gate, the error taxonomy, and the [`store::SupplierStore`] contract that
//! storage backends implement.

// We intentionally use native `async fn` in trait impls (stabilised in Rust
// 1.75). Suppress the advisory lint about `Send` bounds on returned futures.
#![allow(async_fn_in_trait)]

pub mod credential;
pub mod detail;
pub mod directory;
pub mod error;
pub mod session;
pub mod store;
pub mod supplier;

pub use error::{Classify, Error, ErrorKind, Result};
