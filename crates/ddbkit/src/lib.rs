//! Typed DynamoDB tables.
//!
//! `ddbkit` pairs the request builders and pagination engine of
//! [`ddbkit_core`] with concrete stores and two façades over them:
//!
//! - [`Table`] returns futures and lazy `Stream`s.
//! - [`BlockingTable`] blocks the calling thread and returns `Iterator`s.
//!
//! Both run the same pagination state machine.
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): [`DynamoDbStore`] using `aws-sdk-dynamodb`
//! - `inmemory` (default): [`InMemoryStore`] for tests and local development

pub mod blocking;
pub mod config;
pub mod table;
pub mod telemetry;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(all(test, feature = "inmemory"))]
mod testing;

pub use blocking::{BlockingItems, BlockingPaginated, BlockingTable};
pub use config::StoreConfig;
pub use table::{BatchGetRetry, Table, Tables};

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;

pub use ddbkit_core::{
    attributes, builder, condition, definition, pagination, request, storage, AttributeType,
    AttributeValue, Cursor, DecodeError, DecodePolicy, Item, ItemMapper, KeyAttribute,
    KeyCondition, Page, Result, Store, StoreError, TableDefinition, ToAttributeValue,
};
