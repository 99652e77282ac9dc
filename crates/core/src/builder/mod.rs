//! Request builders.
//!
//! Each builder accumulates configuration for one logical operation and
//! produces immutable request values. `build` never mutates the builder.

mod query;
mod scan;
mod support;
mod update;

use std::collections::HashMap;
use std::sync::Arc;

use crate::attributes::Item;
use crate::condition::Expression;
use crate::definition::TableDefinition;
use crate::storage::DecodeError;

pub use query::QueryBuilder;
pub use scan::ScanBuilder;
pub use support::{TableSupport, MAX_BATCH_GET_KEYS};
pub use update::{UpdateAction, UpdateBuilder};

/// Decodes one raw item into a domain value.
pub type ItemDecoder<T> = Arc<dyn Fn(&Item) -> Result<T, DecodeError> + Send + Sync>;

fn definition_decoder<T: 'static>(definition: &Arc<TableDefinition<T>>) -> ItemDecoder<T> {
    let definition = Arc::clone(definition);
    Arc::new(move |item: &Item| definition.from_item(item))
}

/// Combines the placeholder maps of several rendered expressions.
fn merge_expressions<const N: usize>(
    expressions: [Option<Expression>; N],
) -> (HashMap<String, String>, Item) {
    let mut names = HashMap::new();
    let mut values = Item::new();
    for expression in expressions.into_iter().flatten() {
        names.extend(expression.names);
        values.extend(expression.values);
    }
    (names, values)
}
