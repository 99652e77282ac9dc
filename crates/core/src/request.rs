//! Immutable, ready-to-send request values.
//!
//! Builders produce these; `Store` implementations translate them to the wire.
//! Empty placeholder maps mean "not set".

use std::collections::HashMap;

use crate::attributes::Item;
use crate::definition::KeyAttribute;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub table_name: String,
    pub key_condition_expression: Option<String>,
    pub filter_expression: Option<String>,
    pub expression_attribute_names: HashMap<String, String>,
    pub expression_attribute_values: Item,
    pub consistent_read: bool,
    pub limit: Option<i32>,
    pub scan_index_forward: bool,
    pub exclusive_start_key: Option<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub table_name: String,
    pub filter_expression: Option<String>,
    pub expression_attribute_names: HashMap<String, String>,
    pub expression_attribute_values: Item,
    pub consistent_read: bool,
    pub limit: Option<i32>,
    pub exclusive_start_key: Option<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetRequest {
    pub table_name: String,
    pub key: Item,
    pub consistent_read: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchGetRequest {
    pub table_name: String,
    pub keys: Vec<Item>,
    pub consistent_read: bool,
}

impl BatchGetRequest {
    /// The same request for a different set of keys.
    pub fn with_keys(&self, keys: Vec<Item>) -> Self {
        Self {
            table_name: self.table_name.clone(),
            keys,
            consistent_read: self.consistent_read,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    pub table_name: String,
    pub item: Item,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub table_name: String,
    pub key: Item,
    pub update_expression: String,
    pub expression_attribute_names: HashMap<String, String>,
    pub expression_attribute_values: Item,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    pub table_name: String,
    pub key: Item,
}

/// Creates an on-demand table with the given key schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableRequest {
    pub table_name: String,
    pub key_attributes: Vec<KeyAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTableRequest {
    pub table_name: String,
}
