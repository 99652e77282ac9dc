//! Evaluation of the expressions the request builders render.
//!
//! Supports equality conditions (`#a = :a AND #b = :b`) and update
//! expressions with `SET`, `REMOVE` and `ADD` groups.

use std::collections::HashMap;

use ddbkit_core::attributes::{AttributeValue, Item};
use ddbkit_core::storage::{Result, StoreError};

/// One parsed update clause with placeholders resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    Set(String, AttributeValue),
    Remove(String),
    Add(String, AttributeValue),
}

impl UpdateOp {
    pub fn attribute(&self) -> &str {
        match self {
            UpdateOp::Set(name, _) | UpdateOp::Remove(name) | UpdateOp::Add(name, _) => name,
        }
    }
}

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::InvalidRequest(message.into())
}

fn resolve_name(token: &str, names: &HashMap<String, String>) -> Result<String> {
    if token.starts_with('#') {
        names
            .get(token)
            .cloned()
            .ok_or_else(|| invalid(format!("Undefined attribute name placeholder: {token}")))
    } else {
        Ok(token.to_string())
    }
}

fn resolve_value(token: &str, values: &Item) -> Result<AttributeValue> {
    values
        .get(token)
        .cloned()
        .ok_or_else(|| invalid(format!("Undefined attribute value placeholder: {token}")))
}

/// Parses `name = value` terms joined by `AND`.
pub fn parse_equalities(
    expression: &str,
    names: &HashMap<String, String>,
    values: &Item,
) -> Result<Vec<(String, AttributeValue)>> {
    expression
        .split(" AND ")
        .map(|term| {
            let (name, value) = term
                .split_once('=')
                .ok_or_else(|| invalid(format!("Unsupported condition: {term}")))?;
            Ok((
                resolve_name(name.trim(), names)?,
                resolve_value(value.trim(), values)?,
            ))
        })
        .collect()
}

/// Whether `item` satisfies every equality.
pub fn matches(item: &Item, equalities: &[(String, AttributeValue)]) -> bool {
    equalities
        .iter()
        .all(|(name, value)| item.get(name) == Some(value))
}

/// Parses an update expression into clauses in expression order.
pub fn parse_update(
    expression: &str,
    names: &HashMap<String, String>,
    values: &Item,
) -> Result<Vec<UpdateOp>> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for word in expression.split_whitespace() {
        match word {
            "SET" | "REMOVE" | "ADD" => groups.push((word, Vec::new())),
            _ => match groups.last_mut() {
                Some((_, words)) => words.push(word),
                None => return Err(invalid(format!("Unexpected token in update: {word}"))),
            },
        }
    }
    if groups.is_empty() {
        return Err(invalid("Update expression must not be empty"));
    }

    let mut ops = Vec::new();
    for (keyword, words) in groups {
        let body = words.join(" ");
        for clause in body.split(',').map(str::trim) {
            if clause.is_empty() {
                return Err(invalid(format!("Empty {keyword} clause")));
            }
            let op = match keyword {
                "SET" => {
                    let (name, value) = clause
                        .split_once('=')
                        .ok_or_else(|| invalid(format!("Unsupported SET clause: {clause}")))?;
                    UpdateOp::Set(
                        resolve_name(name.trim(), names)?,
                        resolve_value(value.trim(), values)?,
                    )
                }
                "REMOVE" => UpdateOp::Remove(resolve_name(clause, names)?),
                _ => {
                    let (name, value) = clause
                        .split_once(' ')
                        .ok_or_else(|| invalid(format!("Unsupported ADD clause: {clause}")))?;
                    UpdateOp::Add(
                        resolve_name(name.trim(), names)?,
                        resolve_value(value.trim(), values)?,
                    )
                }
            };
            ops.push(op);
        }
    }
    Ok(ops)
}

/// Applies `ops` to `item` in order.
pub fn apply_update(item: &mut Item, ops: Vec<UpdateOp>) -> Result<()> {
    for op in ops {
        match op {
            UpdateOp::Set(name, value) => {
                item.insert(name, value);
            }
            UpdateOp::Remove(name) => {
                item.remove(&name);
            }
            UpdateOp::Add(name, value) => {
                let updated = match item.remove(&name) {
                    None => value,
                    Some(current) => add(&name, current, value)?,
                };
                item.insert(name, updated);
            }
        }
    }
    Ok(())
}

fn add(name: &str, current: AttributeValue, operand: AttributeValue) -> Result<AttributeValue> {
    match (current, operand) {
        (AttributeValue::N(a), AttributeValue::N(b)) => add_numbers(name, &a, &b),
        (AttributeValue::Ss(mut a), AttributeValue::Ss(b)) => {
            union(&mut a, b);
            Ok(AttributeValue::Ss(a))
        }
        (AttributeValue::Ns(mut a), AttributeValue::Ns(b)) => {
            union(&mut a, b);
            Ok(AttributeValue::Ns(a))
        }
        _ => Err(invalid(format!(
            "An operand in the ADD clause has an incorrect data type: {name}"
        ))),
    }
}

fn add_numbers(name: &str, a: &str, b: &str) -> Result<AttributeValue> {
    if let (Ok(a), Ok(b)) = (a.parse::<i128>(), b.parse::<i128>()) {
        return Ok(AttributeValue::N((a + b).to_string()));
    }
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(a), Ok(b)) => Ok(AttributeValue::N((a + b).to_string())),
        _ => Err(invalid(format!("Invalid number in ADD clause for {name}"))),
    }
}

fn union(set: &mut Vec<String>, additions: Vec<String>) {
    for value in additions {
        if !set.contains(&value) {
            set.push(value);
        }
    }
}
