use std::fmt;
use std::sync::Arc;

use crate::attributes::Item;
use crate::condition::FilterCondition;
use crate::definition::TableDefinition;
use crate::pagination::DecodePolicy;
use crate::request::ScanRequest;
use crate::storage::{Cursor, DecodeError};

use super::{merge_expressions, ItemDecoder};

/// Configuration for a paginated Scan.
pub struct ScanBuilder<T> {
    table_name: String,
    filter: FilterCondition,
    consistent_read: bool,
    limit: Option<i32>,
    decoder: ItemDecoder<T>,
    decode_policy: DecodePolicy,
}

impl<T: 'static> ScanBuilder<T> {
    pub fn new(definition: &Arc<TableDefinition<T>>) -> Self {
        Self {
            table_name: definition.name().to_string(),
            filter: FilterCondition::new(),
            consistent_read: false,
            limit: None,
            decoder: super::definition_decoder(definition),
            decode_policy: DecodePolicy::default(),
        }
    }
}

impl<T> ScanBuilder<T> {
    pub fn consistent_read(&mut self) -> &mut Self {
        self.consistent_read = true;
        self
    }

    pub fn limit(&mut self, max_items: i32) -> &mut Self {
        self.limit = Some(max_items);
        self
    }

    pub fn filter<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut FilterCondition),
    {
        configure(&mut self.filter);
        self
    }

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
    pub fn build(&self, cursor: &Cursor) -> ScanRequest {
        let filter = self.filter.render("f");
        let filter_expression = filter.as_ref().map(|e| e.text.clone());
        let (names, values) = merge_expressions([filter]);

        ScanRequest {
            table_name: self.table_name.clone(),
            filter_expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
            consistent_read: self.consistent_read,
            limit: self.limit,
            exclusive_start_key: (!cursor.is_empty()).then(|| cursor.as_item().clone()),
        }
    }
}

impl<T> fmt::Debug for ScanBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanBuilder")
            .field("table_name", &self.table_name)
            .field("filter", &self.filter)
            .field("consistent_read", &self.consistent_read)
            .field("limit", &self.limit)
            .field("decode_policy", &self.decode_policy)
            .finish_non_exhaustive()
    }
}
