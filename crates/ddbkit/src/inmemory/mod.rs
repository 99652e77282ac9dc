//! In-memory storage backend for testing.
//!
//! This module provides an in-memory implementation of the `Store` trait
//! that evaluates the same requests the DynamoDB backend sends: equality
//! key conditions and filters, `Limit` / `ExclusiveStartKey` paging and
//! `SET` / `REMOVE` / `ADD` updates.
//!
//! # Example
//!
//! ```rust,ignore
//! use ddbkit::inmemory::InMemoryStore;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let table = Table::new(store, definition);
//! ```

mod expression;
mod store;

pub use store::InMemoryStore;
