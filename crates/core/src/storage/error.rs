use thiserror::Error;

/// Errors that can occur when converting a raw item into a domain value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),
    #[error("Attribute {attribute} is not of type {expected}")]
    InvalidType {
        attribute: String,
        expected: &'static str,
    },
    #[error("Invalid value for {attribute}: {reason}")]
    InvalidValue { attribute: String, reason: String },
}

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
    #[error("Conditional check failed: {0}")]
    ConditionalCheckFailed(String),
    #[error("Throughput exceeded: {0}")]
    ThroughputExceeded(String),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Request failed: {0}")]
    Service(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
