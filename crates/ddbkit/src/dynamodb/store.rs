//! DynamoDB store implementation.
//!
//! Translates request values from `ddbkit_core::request` into SDK calls.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, KeysAndAttributes,
    ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;

use ddbkit_core::attributes::Item;
use ddbkit_core::definition::{AttributeType, KeyAttribute};
use ddbkit_core::request::{
    BatchGetRequest, CreateTableRequest, DeleteRequest, DeleteTableRequest, GetRequest,
    PutRequest, QueryRequest, ScanRequest, UpdateRequest,
};
use ddbkit_core::storage::{BatchGetOutput, Cursor, Page, RawPage, Result, Store, StoreError};

use super::error::{
    map_batch_get_item_error, map_build_error, map_create_table_error, map_delete_item_error,
    map_delete_table_error, map_describe_table_error, map_get_item_error, map_put_item_error,
    map_query_error, map_scan_error, map_update_item_error,
};
use crate::config::StoreConfig;

const TABLE_ACTIVE_ATTEMPTS: usize = 60;
const TABLE_ACTIVE_DELAY: Duration = Duration::from_secs(2);

/// [`Store`] backed by an `aws_sdk_dynamodb::Client`.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a store for the target described by `config`.
    ///
    /// Credentials come from the AWS SDK default provider chain.
    pub async fn from_config(config: &StoreConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        tracing::debug!(target = %config.target_display(), "Created DynamoDB client");
        Self::new(Client::new(&sdk_config))
    }

    /// Creates a store from `AWS_ENDPOINT_URL` / `AWS_REGION`.
    pub async fn from_env() -> Self {
        Self::from_config(&StoreConfig::from_env()).await
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn wait_for_table_active(&self, table_name: &str) -> Result<()> {
        for _ in 0..TABLE_ACTIVE_ATTEMPTS {
            let response = self
                .client
                .describe_table()
                .table_name(table_name)
                .send()
                .await
                .map_err(|e| map_describe_table_error(e, table_name))?;

            if response.table().and_then(|t| t.table_status()) == Some(&TableStatus::Active) {
                return Ok(());
            }
            tokio::time::sleep(TABLE_ACTIVE_DELAY).await;
        }

        Err(StoreError::Service(format!(
            "Timed out waiting for table {table_name} to become active"
        )))
    }
}

/// `None` for empty maps, which the service rejects.
fn non_empty<K, V>(map: HashMap<K, V>) -> Option<HashMap<K, V>> {
    (!map.is_empty()).then_some(map)
}

fn to_scalar_type(attribute_type: AttributeType) -> ScalarAttributeType {
    match attribute_type {
        AttributeType::String => ScalarAttributeType::S,
        AttributeType::Number => ScalarAttributeType::N,
        AttributeType::Binary => ScalarAttributeType::B,
    }
}

fn key_schema(
    key_attributes: &[KeyAttribute],
) -> Result<(Vec<KeySchemaElement>, Vec<AttributeDefinition>)> {
    let mut key_schema = Vec::with_capacity(key_attributes.len());
    let mut attribute_definitions = Vec::with_capacity(key_attributes.len());

    for (index, key) in key_attributes.iter().enumerate() {
        let key_type = if index == 0 {
            KeyType::Hash
        } else {
            KeyType::Range
        };
        key_schema.push(
            KeySchemaElement::builder()
                .attribute_name(&key.name)
                .key_type(key_type)
                .build()
                .map_err(map_build_error)?,
        );
        attribute_definitions.push(
            AttributeDefinition::builder()
                .attribute_name(&key.name)
                .attribute_type(to_scalar_type(key.attribute_type))
                .build()
                .map_err(map_build_error)?,
        );
    }

    Ok((key_schema, attribute_definitions))
}

#[async_trait]
impl Store for DynamoDbStore {
    async fn query(&self, request: QueryRequest) -> Result<RawPage> {
        let output = self
            .client
            .query()
            .table_name(&request.table_name)
            .set_key_condition_expression(request.key_condition_expression)
            .set_filter_expression(request.filter_expression)
            .set_expression_attribute_names(non_empty(request.expression_attribute_names))
            .set_expression_attribute_values(non_empty(request.expression_attribute_values))
            .consistent_read(request.consistent_read)
            .set_limit(request.limit)
            .scan_index_forward(request.scan_index_forward)
            .set_exclusive_start_key(request.exclusive_start_key)
            .send()
            .await
            .map_err(|e| map_query_error(e, &request.table_name))?;

        Ok(Page::new(
            output.items.unwrap_or_default(),
            Cursor::from(output.last_evaluated_key),
        ))
    }

    async fn scan(&self, request: ScanRequest) -> Result<RawPage> {
        let output = self
            .client
            .scan()
            .table_name(&request.table_name)
            .set_filter_expression(request.filter_expression)
            .set_expression_attribute_names(non_empty(request.expression_attribute_names))
            .set_expression_attribute_values(non_empty(request.expression_attribute_values))
            .consistent_read(request.consistent_read)
            .set_limit(request.limit)
            .set_exclusive_start_key(request.exclusive_start_key)
            .send()
            .await
            .map_err(|e| map_scan_error(e, &request.table_name))?;

        Ok(Page::new(
            output.items.unwrap_or_default(),
            Cursor::from(output.last_evaluated_key),
        ))
    }

    async fn get_item(&self, request: GetRequest) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(&request.table_name)
            .set_key(Some(request.key))
            .consistent_read(request.consistent_read)
            .send()
            .await
            .map_err(|e| map_get_item_error(e, &request.table_name))?;

        Ok(output.item.filter(|item| !item.is_empty()))
    }

    async fn batch_get_item(&self, request: BatchGetRequest) -> Result<BatchGetOutput> {
        let keys_and_attributes = KeysAndAttributes::builder()
            .set_keys(Some(request.keys))
            .consistent_read(request.consistent_read)
            .build()
            .map_err(map_build_error)?;

        let output = self
            .client
            .batch_get_item()
            .request_items(&request.table_name, keys_and_attributes)
            .send()
            .await
            .map_err(|e| map_batch_get_item_error(e, &request.table_name))?;

        let items = output
            .responses
            .and_then(|mut responses| responses.remove(&request.table_name))
            .unwrap_or_default();
        let unprocessed_keys = output
            .unprocessed_keys
            .and_then(|mut unprocessed| unprocessed.remove(&request.table_name))
            .map(|pending| pending.keys().to_vec())
            .unwrap_or_default();

        Ok(BatchGetOutput {
            items,
            unprocessed_keys,
        })
    }

    async fn put_item(&self, request: PutRequest) -> Result<()> {
        self.client
            .put_item()
            .table_name(&request.table_name)
            .set_item(Some(request.item))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, &request.table_name))?;

        Ok(())
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<()> {
        self.client
            .update_item()
            .table_name(&request.table_name)
            .set_key(Some(request.key))
            .update_expression(request.update_expression)
            .set_expression_attribute_names(non_empty(request.expression_attribute_names))
            .set_expression_attribute_values(non_empty(request.expression_attribute_values))
            .send()
            .await
            .map_err(|e| map_update_item_error(e, &request.table_name))?;

        Ok(())
    }

    async fn delete_item(&self, request: DeleteRequest) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&request.table_name)
            .set_key(Some(request.key))
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, &request.table_name))?;

        Ok(())
    }

    async fn create_table(&self, request: CreateTableRequest) -> Result<()> {
        let (key_schema, attribute_definitions) = key_schema(&request.key_attributes)?;

        self.client
            .create_table()
            .table_name(&request.table_name)
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(attribute_definitions))
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|e| map_create_table_error(e, &request.table_name))?;

        self.wait_for_table_active(&request.table_name).await?;
        tracing::info!(table = %request.table_name, "Created table");
        Ok(())
    }

    async fn delete_table(&self, request: DeleteTableRequest) -> Result<()> {
        self.client
            .delete_table()
            .table_name(&request.table_name)
            .send()
            .await
            .map_err(|e| map_delete_table_error(e, &request.table_name))?;

        tracing::info!(table = %request.table_name, "Deleted table");
        Ok(())
    }
}
