//! Static description of a table and the mapping of its items.

use std::fmt;
use std::sync::Arc;

use crate::attributes::Item;
use crate::storage::DecodeError;

/// Scalar types allowed for key attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Number,
    Binary,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl KeyAttribute {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Number)
    }
}

/// Bidirectional mapping between a domain value and its item representation.
///
/// `from_item(&to_item(v))` must reproduce `v`, modulo unset fields.
pub trait ItemMapper<T>: Send + Sync {
    fn to_item(&self, value: &T) -> Item;

    fn from_item(&self, item: &Item) -> Result<T, DecodeError>;
}

/// An [`ItemMapper`] assembled from a pair of closures.
pub struct FnItemMapper<E, D> {
    encode: E,
    decode: D,
}

impl<E, D> FnItemMapper<E, D> {
    pub fn new(encode: E, decode: D) -> Self {
        Self { encode, decode }
    }
}

impl<T, E, D> ItemMapper<T> for FnItemMapper<E, D>
where
    E: Fn(&T) -> Item + Send + Sync,
    D: Fn(&Item) -> Result<T, DecodeError> + Send + Sync,
{
    fn to_item(&self, value: &T) -> Item {
        (self.encode)(value)
    }

    fn from_item(&self, item: &Item) -> Result<T, DecodeError> {
        (self.decode)(item)
    }
}

/// Identity mapper for working with raw items.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawItemMapper;

impl ItemMapper<Item> for RawItemMapper {
    fn to_item(&self, value: &Item) -> Item {
        value.clone()
    }

    fn from_item(&self, item: &Item) -> Result<Item, DecodeError> {
        Ok(item.clone())
    }
}

/// A table's name, key schema and item mapping.
///
/// The first key attribute is the partition key, the optional second one the
/// sort key. Immutable once built; share it behind an `Arc`.
pub struct TableDefinition<T> {
    name: String,
    key_attributes: Vec<KeyAttribute>,
    mapper: Arc<dyn ItemMapper<T>>,
}

impl<T> TableDefinition<T> {
    pub fn new(
        name: impl Into<String>,
        key_attributes: impl IntoIterator<Item = KeyAttribute>,
        mapper: impl ItemMapper<T> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            key_attributes: key_attributes.into_iter().collect(),
            mapper: Arc::new(mapper),
        }
    }

    /// Builds a definition from an encode and a decode closure.
    pub fn with_fns<E, D>(
        name: impl Into<String>,
        key_attributes: impl IntoIterator<Item = KeyAttribute>,
        to_item: E,
        from_item: D,
    ) -> Self
    where
        E: Fn(&T) -> Item + Send + Sync + 'static,
        D: Fn(&Item) -> Result<T, DecodeError> + Send + Sync + 'static,
    {
        Self::new(name, key_attributes, FnItemMapper::new(to_item, from_item))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_attributes(&self) -> &[KeyAttribute] {
        &self.key_attributes
    }

    pub fn partition_key(&self) -> Option<&KeyAttribute> {
        self.key_attributes.first()
    }

    pub fn sort_key(&self) -> Option<&KeyAttribute> {
        self.key_attributes.get(1)
    }

    pub fn to_item(&self, value: &T) -> Item {
        self.mapper.to_item(value)
    }

    pub fn from_item(&self, item: &Item) -> Result<T, DecodeError> {
        self.mapper.from_item(item)
    }

    /// Encodes `value` and keeps only its key attributes.
    pub fn key_of(&self, value: &T) -> Item {
        let mut item = self.to_item(value);
        item.retain(|name, _| self.key_attributes.iter().any(|k| &k.name == name));
        item
    }
}

impl TableDefinition<Item> {
    /// A definition whose domain values are the raw items themselves.
    pub fn raw(
        name: impl Into<String>,
        key_attributes: impl IntoIterator<Item = KeyAttribute>,
    ) -> Self {
        Self::new(name, key_attributes, RawItemMapper)
    }
}

impl<T> fmt::Debug for TableDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDefinition")
            .field("name", &self.name)
            .field("key_attributes", &self.key_attributes)
            .finish_non_exhaustive()
    }
}
