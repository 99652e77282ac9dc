use std::collections::HashMap;
use std::fmt;

use crate::attributes::{Item, ToAttributeValue};
use crate::condition::KeyCondition;
use crate::definition::TableDefinition;
use crate::request::UpdateRequest;

/// Update expression keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    Set,
    Remove,
    Add,
}

impl UpdateAction {
    pub fn keyword(&self) -> &'static str {
        match self {
            UpdateAction::Set => "SET",
            UpdateAction::Remove => "REMOVE",
            UpdateAction::Add => "ADD",
        }
    }
}

impl fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Accumulates a partial update of a single item.
///
/// Every `set` / `remove` / `add` call adds exactly one clause. Clauses are
/// grouped by keyword; groups appear in the order their keyword was first
/// used and clauses keep call order within a group.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table_name: String,
    key: KeyCondition,
    groups: Vec<(UpdateAction, Vec<String>)>,
    names: HashMap<String, String>,
    values: Item,
    next_placeholder: usize,
}

impl UpdateBuilder {
    pub fn new<T>(definition: &TableDefinition<T>) -> Self {
        Self {
            table_name: definition.name().to_string(),
            key: KeyCondition::new(),
            groups: Vec::new(),
            names: HashMap::new(),
            values: Item::new(),
            next_placeholder: 0,
        }
    }

    /// Selects the item to update.
    pub fn key<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut KeyCondition),
    {
        configure(&mut self.key);
        self
    }

    /// `SET name = value`
    pub fn set(&mut self, name: impl Into<String>, value: impl ToAttributeValue) -> &mut Self {
        let (name_placeholder, value_placeholder) = self.placeholders(name.into());
        self.values
            .insert(value_placeholder.clone(), value.to_attribute_value());
        self.push(
            UpdateAction::Set,
            format!("{name_placeholder} = {value_placeholder}"),
        )
    }

    /// `REMOVE name`
    pub fn remove(&mut self, name: impl Into<String>) -> &mut Self {
        let (name_placeholder, _) = self.placeholders(name.into());
        self.push(UpdateAction::Remove, name_placeholder)
    }

    /// One `REMOVE` clause per name.
    pub fn remove_all<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.remove(name);
        }
        self
    }

    /// `ADD name value`: increments a number or adds to a set.
    pub fn add(&mut self, name: impl Into<String>, value: impl ToAttributeValue) -> &mut Self {
        let (name_placeholder, value_placeholder) = self.placeholders(name.into());
        self.values
            .insert(value_placeholder.clone(), value.to_attribute_value());
        self.push(
            UpdateAction::Add,
            format!("{name_placeholder} {value_placeholder}"),
        )
    }

    /// Renders the update expression.
    pub fn expression(&self) -> String {
        self.groups
            .iter()
            .map(|(action, clauses)| format!("{action} {}", clauses.join(", ")))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn build(&self) -> UpdateRequest {
        UpdateRequest {
            table_name: self.table_name.clone(),
            key: self.key.build(),
            update_expression: self.expression(),
            expression_attribute_names: self.names.clone(),
            expression_attribute_values: self.values.clone(),
        }
    }

    fn placeholders(&mut self, name: String) -> (String, String) {
        let index = self.next_placeholder;
        self.next_placeholder += 1;

        let name_placeholder = format!("#u{index}");
        self.names.insert(name_placeholder.clone(), name);
        (name_placeholder, format!(":u{index}"))
    }

    fn push(&mut self, action: UpdateAction, clause: String) -> &mut Self {
        match self.groups.iter_mut().find(|(a, _)| *a == action) {
            Some((_, clauses)) => clauses.push(clause),
            None => self.groups.push((action, vec![clause])),
        }
        self
    }
}
