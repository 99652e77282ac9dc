use std::sync::Arc;

use crate::attributes::Item;
use crate::definition::TableDefinition;
use crate::request::{
    BatchGetRequest, CreateTableRequest, DeleteRequest, DeleteTableRequest, GetRequest, PutRequest,
};

/// Maximum number of keys DynamoDB accepts in one BatchGetItem call.
pub const MAX_BATCH_GET_KEYS: usize = 100;

/// Builds the single-shot requests of a table: get, batch get, put, delete
/// and the table DDL.
#[derive(Debug)]
pub struct TableSupport<T> {
    definition: Arc<TableDefinition<T>>,
}

impl<T> Clone for TableSupport<T> {
    fn clone(&self) -> Self {
        Self {
            definition: Arc::clone(&self.definition),
        }
    }
}

impl<T> TableSupport<T> {
    pub fn new(definition: Arc<TableDefinition<T>>) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &Arc<TableDefinition<T>> {
        &self.definition
    }

    pub fn put_request(&self, value: &T) -> PutRequest {
        PutRequest {
            table_name: self.table_name(),
            item: self.definition.to_item(value),
        }
    }

    /// Looks up `key` using only its key attributes.
    pub fn get_request(&self, key: &T) -> GetRequest {
        GetRequest {
            table_name: self.table_name(),
            key: self.definition.key_of(key),
            consistent_read: false,
        }
    }

    /// Splits `keys` into BatchGetItem requests of at most
    /// [`MAX_BATCH_GET_KEYS`] keys each. Duplicate keys are sent once.
    pub fn batch_get_requests<'a, I>(&self, keys: I) -> Vec<BatchGetRequest>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut unique: Vec<Item> = Vec::new();
        for key in keys {
            let key = self.definition.key_of(key);
            if !unique.contains(&key) {
                unique.push(key);
            }
        }

        unique
            .chunks(MAX_BATCH_GET_KEYS)
            .map(|chunk| BatchGetRequest {
                table_name: self.table_name(),
                keys: chunk.to_vec(),
                consistent_read: false,
            })
            .collect()
    }

    pub fn delete_request(&self, key: &T) -> DeleteRequest {
        DeleteRequest {
            table_name: self.table_name(),
            key: self.definition.key_of(key),
        }
    }

    pub fn create_table_request(&self) -> CreateTableRequest {
        CreateTableRequest {
            table_name: self.table_name(),
            key_attributes: self.definition.key_attributes().to_vec(),
        }
    }

    pub fn delete_table_request(&self) -> DeleteTableRequest {
        DeleteTableRequest {
            table_name: self.table_name(),
        }
    }

    fn table_name(&self) -> String {
        self.definition.name().to_string()
    }
}
