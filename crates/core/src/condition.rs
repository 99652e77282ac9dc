//! Equality condition DSL for keys and filters.

use std::collections::{BTreeMap, HashMap};

use crate::attributes::{AttributeValue, Item, ToAttributeValue};

/// Accumulates `attribute = value` equalities.
///
/// Setting the same attribute twice keeps the last value. There is no
/// `PartialEq` impl since it would shadow [`KeyCondition::eq`].
#[derive(Debug, Clone, Default)]
pub struct KeyCondition {
    attributes: BTreeMap<String, AttributeValue>,
}

/// Filters share the equality DSL with key conditions.
pub type FilterCondition = KeyCondition;

impl KeyCondition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `name` to equal `value`.
    pub fn eq(&mut self, name: impl Into<String>, value: impl ToAttributeValue) -> &mut Self {
        self.attributes
            .insert(name.into(), value.to_attribute_value());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns a snapshot of the accumulated attributes.
    pub fn build(&self) -> Item {
        self.attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Renders the equalities as an expression with `#{prefix}N` / `:{prefix}N`
    /// placeholders, attributes in name order. `None` when empty.
    pub(crate) fn render(&self, prefix: &str) -> Option<Expression> {
        if self.attributes.is_empty() {
            return None;
        }

        let mut expression = Expression::default();
        let clauses: Vec<String> = self
            .attributes
            .iter()
            .enumerate()
            .map(|(index, (name, value))| {
                let name_placeholder = format!("#{prefix}{index}");
                let value_placeholder = format!(":{prefix}{index}");
                let clause = format!("{name_placeholder} = {value_placeholder}");
                expression.names.insert(name_placeholder, name.clone());
                expression.values.insert(value_placeholder, value.clone());
                clause
            })
            .collect();
        expression.text = clauses.join(" AND ");

        Some(expression)
    }
}

/// A rendered expression together with its placeholder maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Expression {
    pub text: String,
    pub names: HashMap<String, String>,
    pub values: Item,
}
