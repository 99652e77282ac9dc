//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `ddbkit_core::storage`.

use std::error::Error;
use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::batch_get_item::BatchGetItemError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::delete_table::DeleteTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use ddbkit_core::storage::StoreError;

const THROUGHPUT_EXCEEDED: &str = "Throughput exceeded, please retry";
const REQUEST_LIMIT_EXCEEDED: &str = "Request limit exceeded, please retry";
const INTERNAL_SERVER_ERROR: &str = "DynamoDB internal server error";

/// Errors raised before a response was received.
fn transport_error<E, R>(err: &SdkError<E, R>, operation: &str) -> Option<StoreError>
where
    E: Error + 'static,
    R: Debug,
{
    match err {
        SdkError::ConstructionFailure(_) => Some(StoreError::InvalidRequest(format!(
            "{operation} request could not be built: {}",
            DisplayErrorContext(err)
        ))),
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => Some(StoreError::Connection(
            format!("{operation} failed: {}", DisplayErrorContext(err)),
        )),
        _ => None,
    }
}

/// Service errors without a dedicated variant. Request validation failures
/// come back unmodeled with a `ValidationException` code.
fn unmodeled_error<E>(operation: &str, err: E) -> StoreError
where
    E: ProvideErrorMetadata + Error + 'static,
{
    let message = format!("{operation} failed: {}", DisplayErrorContext(&err));
    match err.code() {
        Some("ValidationException") => StoreError::InvalidRequest(message),
        _ => StoreError::Service(message),
    }
}

fn table_not_found(table_name: &str) -> StoreError {
    StoreError::ResourceNotFound(format!("Table not found: {table_name}"))
}

/// Map a Query SDK error to StoreError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "Query") {
        return err;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => table_not_found(table_name),
        QueryError::ProvisionedThroughputExceededException(_) => {
            StoreError::ThroughputExceeded(THROUGHPUT_EXCEEDED.to_string())
        }
        QueryError::RequestLimitExceeded(_) => {
            StoreError::ThroughputExceeded(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        QueryError::InternalServerError(_) => {
            StoreError::Service(INTERNAL_SERVER_ERROR.to_string())
        }
        err => unmodeled_error("Query", err),
    }
}

/// Map a Scan SDK error to StoreError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "Scan") {
        return err;
    }
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => table_not_found(table_name),
        ScanError::ProvisionedThroughputExceededException(_) => {
            StoreError::ThroughputExceeded(THROUGHPUT_EXCEEDED.to_string())
        }
        ScanError::RequestLimitExceeded(_) => {
            StoreError::ThroughputExceeded(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        ScanError::InternalServerError(_) => StoreError::Service(INTERNAL_SERVER_ERROR.to_string()),
        err => unmodeled_error("Scan", err),
    }
}

/// Map a GetItem SDK error to StoreError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "GetItem") {
        return err;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => table_not_found(table_name),
        GetItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::ThroughputExceeded(THROUGHPUT_EXCEEDED.to_string())
        }
        GetItemError::RequestLimitExceeded(_) => {
            StoreError::ThroughputExceeded(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        GetItemError::InternalServerError(_) => {
            StoreError::Service(INTERNAL_SERVER_ERROR.to_string())
        }
        err => unmodeled_error("GetItem", err),
    }
}

/// Map a BatchGetItem SDK error to StoreError.
pub fn map_batch_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchGetItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "BatchGetItem") {
        return err;
    }
    match err.into_service_error() {
        BatchGetItemError::ResourceNotFoundException(_) => table_not_found(table_name),
        BatchGetItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::ThroughputExceeded(THROUGHPUT_EXCEEDED.to_string())
        }
        BatchGetItemError::RequestLimitExceeded(_) => {
            StoreError::ThroughputExceeded(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        BatchGetItemError::InternalServerError(_) => {
            StoreError::Service(INTERNAL_SERVER_ERROR.to_string())
        }
        err => unmodeled_error("BatchGetItem", err),
    }
}

/// Map a PutItem SDK error to StoreError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "PutItem") {
        return err;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(e) => StoreError::ConditionalCheckFailed(
            e.message().unwrap_or("PutItem condition not met").to_string(),
        ),
        PutItemError::ResourceNotFoundException(_) => table_not_found(table_name),
        PutItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::ThroughputExceeded(THROUGHPUT_EXCEEDED.to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            StoreError::ThroughputExceeded(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::Service("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            StoreError::Service("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => {
            StoreError::Service(INTERNAL_SERVER_ERROR.to_string())
        }
        err => unmodeled_error("PutItem", err),
    }
}

/// Map an UpdateItem SDK error to StoreError.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "UpdateItem") {
        return err;
    }
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(e) => StoreError::ConditionalCheckFailed(
            e.message()
                .unwrap_or("UpdateItem condition not met")
                .to_string(),
        ),
        UpdateItemError::ResourceNotFoundException(_) => table_not_found(table_name),
        UpdateItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::ThroughputExceeded(THROUGHPUT_EXCEEDED.to_string())
        }
        UpdateItemError::RequestLimitExceeded(_) => {
            StoreError::ThroughputExceeded(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        UpdateItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::Service("Item collection size limit exceeded".to_string())
        }
        UpdateItemError::TransactionConflictException(_) => {
            StoreError::Service("Transaction conflict, please retry".to_string())
        }
        UpdateItemError::InternalServerError(_) => {
            StoreError::Service(INTERNAL_SERVER_ERROR.to_string())
        }
        err => unmodeled_error("UpdateItem", err),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "DeleteItem") {
        return err;
    }
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(e) => StoreError::ConditionalCheckFailed(
            e.message()
                .unwrap_or("DeleteItem condition not met")
                .to_string(),
        ),
        DeleteItemError::ResourceNotFoundException(_) => table_not_found(table_name),
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::ThroughputExceeded(THROUGHPUT_EXCEEDED.to_string())
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            StoreError::ThroughputExceeded(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        DeleteItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::Service("Item collection size limit exceeded".to_string())
        }
        DeleteItemError::TransactionConflictException(_) => {
            StoreError::Service("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => {
            StoreError::Service(INTERNAL_SERVER_ERROR.to_string())
        }
        err => unmodeled_error("DeleteItem", err),
    }
}

/// Map a CreateTable SDK error to StoreError.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "CreateTable") {
        return err;
    }
    match err.into_service_error() {
        CreateTableError::ResourceInUseException(_) => {
            StoreError::Service(format!("Table already exists: {table_name}"))
        }
        CreateTableError::LimitExceededException(_) => {
            StoreError::ThroughputExceeded("Too many concurrent table operations".to_string())
        }
        CreateTableError::InternalServerError(_) => {
            StoreError::Service(INTERNAL_SERVER_ERROR.to_string())
        }
        err => unmodeled_error("CreateTable", err),
    }
}

/// Map a DeleteTable SDK error to StoreError.
pub fn map_delete_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "DeleteTable") {
        return err;
    }
    match err.into_service_error() {
        DeleteTableError::ResourceNotFoundException(_) => table_not_found(table_name),
        DeleteTableError::ResourceInUseException(_) => {
            StoreError::Service(format!("Table is busy: {table_name}"))
        }
        DeleteTableError::LimitExceededException(_) => {
            StoreError::ThroughputExceeded("Too many concurrent table operations".to_string())
        }
        DeleteTableError::InternalServerError(_) => {
            StoreError::Service(INTERNAL_SERVER_ERROR.to_string())
        }
        err => unmodeled_error("DeleteTable", err),
    }
}

/// Map a DescribeTable SDK error to StoreError.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(err) = transport_error(&err, "DescribeTable") {
        return err;
    }
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => table_not_found(table_name),
        DescribeTableError::InternalServerError(_) => {
            StoreError::Service(INTERNAL_SERVER_ERROR.to_string())
        }
        err => unmodeled_error("DescribeTable", err),
    }
}

/// Map a request value that the SDK builders rejected.
pub fn map_build_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::InvalidRequest(err.to_string())
}
