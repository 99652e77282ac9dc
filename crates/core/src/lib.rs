//! Pure core of the ddbkit DynamoDB access layer.
//!
//! Everything here is free of I/O except through the [`storage::Store`]
//! trait: the condition DSL, the request builders, the request values they
//! produce and the pagination engine shared by the async and blocking
//! façades of the `ddbkit` crate.

pub mod attributes;
pub mod builder;
pub mod condition;
pub mod definition;
pub mod pagination;
pub mod request;
pub mod storage;

pub use attributes::{AttributeValue, Item, ToAttributeValue};
pub use condition::{FilterCondition, KeyCondition};
pub use definition::{AttributeType, ItemMapper, KeyAttribute, TableDefinition};
pub use pagination::{DecodePolicy, PageSource, Paginated, Paginator};
pub use storage::{Cursor, DecodeError, Page, Result, Store, StoreError};
