//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the `Store` trait
//! using `aws-sdk-dynamodb`.

mod error;
mod store;

pub use store::DynamoDbStore;
