use std::fmt;
use std::sync::Arc;

use crate::attributes::Item;
use crate::condition::{FilterCondition, KeyCondition};
use crate::definition::TableDefinition;
use crate::pagination::DecodePolicy;
use crate::request::QueryRequest;
use crate::storage::{Cursor, DecodeError};

use super::{merge_expressions, ItemDecoder};

/// Configuration for a paginated Query.
///
/// The façade applies the caller's configure closure once, then calls
/// [`QueryBuilder::build`] for every page with that page's cursor.
pub struct QueryBuilder<T> {
    table_name: String,
    key_condition: KeyCondition,
    filter: FilterCondition,
    consistent_read: bool,
    limit: Option<i32>,
    scan_index_forward: bool,
    decoder: ItemDecoder<T>,
    decode_policy: DecodePolicy,
}

impl<T: 'static> QueryBuilder<T> {
    /// Starts a query against `definition`, decoding with its mapper.
    pub fn new(definition: &Arc<TableDefinition<T>>) -> Self {
        Self {
            table_name: definition.name().to_string(),
            key_condition: KeyCondition::new(),
            filter: FilterCondition::new(),
            consistent_read: false,
            limit: None,
            scan_index_forward: true,
            decoder: super::definition_decoder(definition),
            decode_policy: DecodePolicy::default(),
        }
    }
}

impl<T> QueryBuilder<T> {
    pub fn consistent_read(&mut self) -> &mut Self {
        self.consistent_read = true;
        self
    }

    /// Maximum number of items evaluated per page.
    pub fn limit(&mut self, max_items: i32) -> &mut Self {
        self.limit = Some(max_items);
        self
    }

    pub fn key_condition<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut KeyCondition),
    {
        configure(&mut self.key_condition);
        self
    }

    pub fn filter<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut FilterCondition),
    {
        configure(&mut self.filter);
        self
    }

    /// Returns items in descending sort key order.
    pub fn descending(&mut self) -> &mut Self {
        self.scan_index_forward = false;
        self
    }

    /// Decodes items of this query with `mapper` instead of the table's mapper.
    pub fn mapping_items<F>(&mut self, mapper: F) -> &mut Self
    where
        F: Fn(&Item) -> Result<T, DecodeError> + Send + Sync + 'static,
    {
        self.decoder = Arc::new(mapper);
        self
    }

    pub fn on_decode_error(&mut self, policy: DecodePolicy) -> &mut Self {
        self.decode_policy = policy;
        self
    }

    pub fn decoder(&self) -> ItemDecoder<T> {
        Arc::clone(&self.decoder)
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        self.decode_policy
    }

    /// Builds the request for the page starting at `cursor`.
    pub fn build(&self, cursor: &Cursor) -> QueryRequest {
        let key_condition = self.key_condition.render("k");
        let filter = self.filter.render("f");

        let key_condition_expression = key_condition.as_ref().map(|e| e.text.clone());
        let filter_expression = filter.as_ref().map(|e| e.text.clone());
        let (names, values) = merge_expressions([key_condition, filter]);

        QueryRequest {
            table_name: self.table_name.clone(),
            key_condition_expression,
            filter_expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
            consistent_read: self.consistent_read,
            limit: self.limit,
            scan_index_forward: self.scan_index_forward,
            exclusive_start_key: (!cursor.is_empty()).then(|| cursor.as_item().clone()),
        }
    }
}

impl<T> fmt::Debug for QueryBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("table_name", &self.table_name)
            .field("key_condition", &self.key_condition)
            .field("filter", &self.filter)
            .field("consistent_read", &self.consistent_read)
            .field("limit", &self.limit)
            .field("scan_index_forward", &self.scan_index_forward)
            .field("decode_policy", &self.decode_policy)
            .finish_non_exhaustive()
    }
}
