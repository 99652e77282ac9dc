//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between native values and `AttributeValue`
//! maps. Mappers use the `get_*` helpers to decode items field by field.

use std::collections::HashMap;
use std::str::FromStr;

pub use aws_sdk_dynamodb::types::AttributeValue;

use crate::storage::DecodeError;

/// One record in the store: attribute name to wire value.
pub type Item = HashMap<String, AttributeValue>;

/// Converts a native scalar into its wire representation.
pub trait ToAttributeValue {
    fn to_attribute_value(&self) -> AttributeValue;
}

impl ToAttributeValue for str {
    fn to_attribute_value(&self) -> AttributeValue {
        AttributeValue::S(self.to_string())
    }
}

impl ToAttributeValue for String {
    fn to_attribute_value(&self) -> AttributeValue {
        AttributeValue::S(self.clone())
    }
}

impl ToAttributeValue for AttributeValue {
    fn to_attribute_value(&self) -> AttributeValue {
        self.clone()
    }
}

impl<T: ToAttributeValue + ?Sized> ToAttributeValue for &T {
    fn to_attribute_value(&self) -> AttributeValue {
        (**self).to_attribute_value()
    }
}

macro_rules! number_to_attribute_value {
    ($($ty:ty),*) => {
        $(
            impl ToAttributeValue for $ty {
                fn to_attribute_value(&self) -> AttributeValue {
                    AttributeValue::N(self.to_string())
                }
            }
        )*
    };
}

number_to_attribute_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

// ============================================================================
// Decode helpers
// ============================================================================

/// Get a required string attribute.
pub fn get_string(item: &Item, key: &str) -> Result<String, DecodeError> {
    match item.get(key) {
        Some(AttributeValue::S(s)) => Ok(s.clone()),
        Some(_) => Err(DecodeError::InvalidType {
            attribute: key.to_string(),
            expected: "S",
        }),
        None => Err(DecodeError::MissingAttribute(key.to_string())),
    }
}

/// Get an optional string attribute.
pub fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

/// Get a required numeric attribute, parsed into `N`.
pub fn get_number<N>(item: &Item, key: &str) -> Result<N, DecodeError>
where
    N: FromStr,
    N::Err: std::fmt::Display,
{
    match item.get(key) {
        Some(AttributeValue::N(n)) => n.parse().map_err(|e: N::Err| DecodeError::InvalidValue {
            attribute: key.to_string(),
            reason: e.to_string(),
        }),
        Some(_) => Err(DecodeError::InvalidType {
            attribute: key.to_string(),
            expected: "N",
        }),
        None => Err(DecodeError::MissingAttribute(key.to_string())),
    }
}

/// Get an optional numeric attribute. Present but unparsable values are errors.
pub fn get_optional_number<N>(item: &Item, key: &str) -> Result<Option<N>, DecodeError>
where
    N: FromStr,
    N::Err: std::fmt::Display,
{
    match item.get(key) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(_) => get_number(item, key).map(Some),
    }
}

/// Get a required boolean attribute.
pub fn get_bool(item: &Item, key: &str) -> Result<bool, DecodeError> {
    match item.get(key) {
        Some(AttributeValue::Bool(b)) => Ok(*b),
        Some(_) => Err(DecodeError::InvalidType {
            attribute: key.to_string(),
            expected: "BOOL",
        }),
        None => Err(DecodeError::MissingAttribute(key.to_string())),
    }
}
