//! Error types for DynamoDB operations.

use ddbkit::StoreError;
use thiserror::Error;

/// Result type alias for dynamodb module.
pub type Result<T> = std::result::Result<T, DynamodbError>;

/// Errors that can occur during DynamoDB operations.
#[derive(Error, Debug)]
pub enum DynamodbError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid key attribute: {0}")]
    InvalidKey(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Operation cancelled by user")]
    UserCancelled,
}
