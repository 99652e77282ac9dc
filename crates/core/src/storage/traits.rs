use async_trait::async_trait;

use crate::attributes::Item;
use crate::request::{
    BatchGetRequest, CreateTableRequest, DeleteRequest, DeleteTableRequest, GetRequest, PutRequest,
    QueryRequest, ScanRequest, UpdateRequest,
};

use super::{BatchGetOutput, RawPage, Result};

/// Request/response access to a DynamoDB-compatible store.
///
/// One method per wire operation. Implementations do not retry; failures
/// surface to the caller of the operation that issued them.
#[async_trait]
pub trait Store: Send + Sync {
    /// Runs one Query page.
    async fn query(&self, request: QueryRequest) -> Result<RawPage>;

    /// Runs one Scan page.
    async fn scan(&self, request: ScanRequest) -> Result<RawPage>;

    /// Looks up a single item by key. `None` when no record exists.
    async fn get_item(&self, request: GetRequest) -> Result<Option<Item>>;

    /// Looks up up to 100 items by key in a single call.
    async fn batch_get_item(&self, request: BatchGetRequest) -> Result<BatchGetOutput>;

    /// Writes an item, replacing any existing item with the same key.
    async fn put_item(&self, request: PutRequest) -> Result<()>;

    /// Applies a partial update to the item with the given key.
    async fn update_item(&self, request: UpdateRequest) -> Result<()>;

    /// Deletes the item with the given key. Succeeds when it does not exist.
    async fn delete_item(&self, request: DeleteRequest) -> Result<()>;

    /// Creates a table and waits until it can serve requests.
    async fn create_table(&self, request: CreateTableRequest) -> Result<()>;

    /// Deletes a table.
    async fn delete_table(&self, request: DeleteTableRequest) -> Result<()>;
}
