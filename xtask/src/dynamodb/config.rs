//! Table description from the command line (Functional Core - pure data).

use std::str::FromStr;

use ddbkit::{AttributeType, AttributeValue, Item, KeyAttribute, TableDefinition};

use super::error::DynamodbError;

/// A key attribute given as `name[:S|N|B]`. The type defaults to `S`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec(pub KeyAttribute);

impl FromStr for KeySpec {
    type Err = DynamodbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, attribute_type) = match s.split_once(':') {
            Some((name, kind)) => (name, parse_attribute_type(kind)?),
            None => (s, AttributeType::String),
        };

        if name.is_empty() {
            return Err(DynamodbError::InvalidKey(format!(
                "missing attribute name in '{s}'"
            )));
        }

        Ok(Self(KeyAttribute::new(name, attribute_type)))
    }
}

fn parse_attribute_type(kind: &str) -> Result<AttributeType, DynamodbError> {
    match kind.to_ascii_uppercase().as_str() {
        "S" => Ok(AttributeType::String),
        "N" => Ok(AttributeType::Number),
        "B" => Ok(AttributeType::Binary),
        other => Err(DynamodbError::InvalidKey(format!(
            "unknown attribute type '{other}', expected S, N or B"
        ))),
    }
}

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
}

impl TableConfig {
    pub fn new(table_name: &str, partition_key: KeySpec, sort_key: Option<KeySpec>) -> Self {
        Self {
            table_name: table_name.to_string(),
            partition_key: partition_key.0,
            sort_key: sort_key.map(|k| k.0),
        }
    }

    pub fn key_attributes(&self) -> Vec<KeyAttribute> {
        std::iter::once(self.partition_key.clone())
            .chain(self.sort_key.clone())
            .collect()
    }

    /// A raw-item definition of the table.
    pub fn definition(&self) -> TableDefinition<Item> {
        TableDefinition::raw(self.table_name.clone(), self.key_attributes())
    }
}

/// Lines describing the table, for plans and summaries.
pub fn format_table_config(config: &TableConfig) -> Vec<String> {
    let mut lines = vec![
        format!("Table: {}", config.table_name),
        format!(
            "Partition key: {} ({})",
            config.partition_key.name,
            type_code(config.partition_key.attribute_type)
        ),
    ];
    if let Some(sk) = &config.sort_key {
        lines.push(format!(
            "Sort key: {} ({})",
            sk.name,
            type_code(sk.attribute_type)
        ));
    }
    lines.push("Billing: PAY_PER_REQUEST".to_string());
    lines
}

fn type_code(attribute_type: AttributeType) -> &'static str {
    match attribute_type {
        AttributeType::String => "S",
        AttributeType::Number => "N",
        AttributeType::Binary => "B",
    }
}

/// Renders an item as `{name: value, ...}` with attributes in name order.
pub fn format_item(item: &Item) -> String {
    let mut names: Vec<&String> = item.keys().collect();
    names.sort();

    let fields: Vec<String> = names
        .into_iter()
        .map(|name| format!("{}: {}", name, format_value(&item[name])))
        .collect();
    format!("{{{}}}", fields.join(", "))
}

fn format_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::S(s) => format!("{s:?}"),
        AttributeValue::N(n) => n.clone(),
        AttributeValue::Bool(b) => b.to_string(),
        AttributeValue::Null(_) => "null".to_string(),
        AttributeValue::B(b) => format!("<{} bytes>", b.as_ref().len()),
        AttributeValue::Ss(values) => format!("{values:?}"),
        AttributeValue::Ns(values) => format!("[{}]", values.join(", ")),
        AttributeValue::L(values) => format!(
            "[{}]",
            values.iter().map(format_value).collect::<Vec<_>>().join(", ")
        ),
        AttributeValue::M(map) => format_item(map),
        other => format!("{other:?}"),
    }
}
